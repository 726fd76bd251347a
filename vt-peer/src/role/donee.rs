use crate::config::PeerConfig;
use crate::role::{Role, RoleStrategy};
use vt_core::IceServerConfig;

/// Requests compute. Waits for a donor's offer and answers it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Donee;

impl RoleStrategy for Donee {
    fn role(&self) -> Role {
        Role::Donee
    }

    fn should_initiate(&self) -> bool {
        false
    }

    fn ice_servers(&self, config: &PeerConfig) -> Vec<IceServerConfig> {
        config.stun.iter().cloned().collect()
    }
}
