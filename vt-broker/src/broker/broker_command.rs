use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use vt_core::{ClientSignal, ConnectionId, RoomName, RoomSummary, ServerSignal};

/// Commands processed, in arrival order, by the broker event loop.
#[derive(Debug)]
pub enum BrokerCommand {
    /// A relay connection was accepted and wants outbound envelopes.
    Connect {
        connection_id: ConnectionId,
        outbound: mpsc::UnboundedSender<ServerSignal>,
    },

    JoinRoom {
        from: ConnectionId,
        room: RoomName,
    },

    SendOffer {
        from: ConnectionId,
        to: ConnectionId,
        sdp: Value,
    },

    SendAnswer {
        from: ConnectionId,
        to: ConnectionId,
        sdp: Value,
    },

    /// `to: None` fans the candidate out to the rest of the sender's room.
    SendIceCandidate {
        from: ConnectionId,
        to: Option<ConnectionId>,
        label: Option<String>,
        candidate: Value,
    },

    /// The relay connection closed.
    Disconnect { connection_id: ConnectionId },

    ListRooms {
        reply: oneshot::Sender<Vec<RoomSummary>>,
    },
}

impl BrokerCommand {
    pub fn from_signal(from: ConnectionId, signal: ClientSignal) -> Self {
        match signal {
            ClientSignal::JoinRoom { room } => BrokerCommand::JoinRoom { from, room },
            ClientSignal::SendOffer { socket_id, sdp } => BrokerCommand::SendOffer {
                from,
                to: socket_id,
                sdp,
            },
            ClientSignal::SendAnswer { socket_id, sdp } => BrokerCommand::SendAnswer {
                from,
                to: socket_id,
                sdp,
            },
            ClientSignal::SendIceCandidate {
                label,
                candidate,
                socket_id,
            } => BrokerCommand::SendIceCandidate {
                from,
                to: socket_id,
                label,
                candidate,
            },
        }
    }
}
