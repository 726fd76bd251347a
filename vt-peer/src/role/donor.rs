use crate::config::PeerConfig;
use crate::role::{Role, RoleStrategy};
use vt_core::IceServerConfig;

/// Offers compute. Initiates to every donee it learns about and adds the
/// configured TURN relay to its ICE set.
#[derive(Debug, Clone, Copy, Default)]
pub struct Donor;

impl RoleStrategy for Donor {
    fn role(&self) -> Role {
        Role::Donor
    }

    fn should_initiate(&self) -> bool {
        true
    }

    fn ice_servers(&self, config: &PeerConfig) -> Vec<IceServerConfig> {
        config
            .stun
            .iter()
            .chain(config.turn.iter())
            .cloned()
            .collect()
    }

    fn missing_relay(&self, config: &PeerConfig) -> bool {
        config.turn.is_none()
    }
}
