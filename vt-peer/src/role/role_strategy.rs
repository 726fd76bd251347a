use crate::config::PeerConfig;
use std::fmt;
use vt_core::{ConnectionId, IceServerConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Donor,
    Donee,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Donor => f.write_str("donor"),
            Role::Donee => f.write_str("donee"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerJoinedAction {
    Initiate,
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferAction {
    Answer,
    Ignore,
}

/// Decides which side of a pairing initiates and which ICE servers it uses.
pub trait RoleStrategy: Send + Sync + 'static {
    fn role(&self) -> Role;

    fn should_initiate(&self) -> bool;

    fn ice_servers(&self, config: &PeerConfig) -> Vec<IceServerConfig>;

    fn on_peer_joined(&self, _peer: &ConnectionId) -> PeerJoinedAction {
        if self.should_initiate() {
            PeerJoinedAction::Initiate
        } else {
            PeerJoinedAction::Ignore
        }
    }

    fn on_offer_received(&self, _peer: &ConnectionId) -> OfferAction {
        if self.should_initiate() {
            OfferAction::Ignore
        } else {
            OfferAction::Answer
        }
    }

    fn accepts_answers(&self) -> bool {
        self.should_initiate()
    }

    /// True when this role should offer a TURN relay and `config` has none.
    fn missing_relay(&self, _config: &PeerConfig) -> bool {
        false
    }
}
