use crate::negotiation::NegotiationState;
use thiserror::Error;
use vt_core::ConnectionId;

#[derive(Debug, Error)]
pub enum PeerError {
    /// The relay could not be opened or closed underneath the session.
    #[error("relay connection failed: {0}")]
    RelayConnection(String),

    #[error("no peer record for connection {0}")]
    UnknownPeer(ConnectionId),

    #[error("{operation} is not valid for peer {peer} in state {state}")]
    NegotiationState {
        peer: ConnectionId,
        operation: &'static str,
        state: NegotiationState,
    },

    #[error("data channel is not established")]
    DataChannelNotReady { peer: Option<ConnectionId> },

    #[error("invalid signal payload: {0}")]
    InvalidSignal(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(String),
}

impl From<webrtc::Error> for PeerError {
    fn from(e: webrtc::Error) -> Self {
        PeerError::Transport(e.to_string())
    }
}

