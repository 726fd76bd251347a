use std::env;
use vt_core::{IceServerConfig, RoomName};

/// What a session does with an envelope naming a peer it has no record for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownPeerPolicy {
    /// Log and continue. A disconnect racing a late candidate lands here.
    #[default]
    Drop,
    /// End the session with [`crate::PeerError::UnknownPeer`].
    Fail,
}

/// What a session does after a peer's negotiation step fails. The failed
/// record is discarded and [`crate::ExecutionChannel::on_failed`] runs first
/// under either policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Keep serving the other peers. A later announcement or offer from the
    /// same peer negotiates from scratch.
    #[default]
    Discard,
    /// End the session with the step's error.
    Fail,
}

#[derive(Debug, Clone)]
pub struct PeerConfig {
    pub room: RoomName,
    pub stun: Option<IceServerConfig>,
    /// Relay server, only offered by the donor.
    pub turn: Option<IceServerConfig>,
    pub trickle: bool,
    pub unknown_peer: UnknownPeerPolicy,
    pub negotiation_failure: FailurePolicy,
    pub channel_label: String,
    /// Capacity of each per-peer command and transport-event queue.
    pub peer_buffer: usize,
}

impl PeerConfig {
    pub fn new(room: impl Into<RoomName>) -> Self {
        Self {
            room: room.into(),
            stun: Some(IceServerConfig::default()),
            turn: None,
            trickle: true,
            unknown_peer: UnknownPeerPolicy::default(),
            negotiation_failure: FailurePolicy::default(),
            channel_label: "vt100".to_string(),
            peer_buffer: 256,
        }
    }

    /// Reads `TRICKLE` and the `VT_TURN_*` variables on top of [`PeerConfig::new`].
    pub fn from_env(room: impl Into<RoomName>) -> Self {
        let mut config = Self::new(room);

        if let Ok(trickle) = env::var("TRICKLE") {
            config.trickle = trickle.eq_ignore_ascii_case("true");
        }

        if let Ok(url) = env::var("VT_TURN_URL") {
            config.turn = Some(IceServerConfig {
                urls: vec![url],
                username: env::var("VT_TURN_USERNAME").ok(),
                credential: env::var("VT_TURN_CREDENTIAL").ok(),
            });
        }

        config
    }
}
