use crate::model::connection::ConnectionId;
use crate::model::room::RoomName;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelopes a peer sends to the broker.
///
/// `sdp` and `candidate` are carried as raw JSON values: the broker relays
/// them without looking inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "eventName",
    content = "data",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ClientSignal {
    JoinRoom {
        room: RoomName,
    },
    SendOffer {
        socket_id: ConnectionId,
        sdp: Value,
    },
    SendAnswer {
        socket_id: ConnectionId,
        sdp: Value,
    },
    SendIceCandidate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        candidate: Value,
        /// Target connection. When absent the broker fans out to the rest of
        /// the sender's room.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        socket_id: Option<ConnectionId>,
    },
}

impl ClientSignal {
    pub fn event_name(&self) -> &'static str {
        match self {
            ClientSignal::JoinRoom { .. } => "join_room",
            ClientSignal::SendOffer { .. } => "send_offer",
            ClientSignal::SendAnswer { .. } => "send_answer",
            ClientSignal::SendIceCandidate { .. } => "send_ice_candidate",
        }
    }
}

/// Envelopes the broker sends to a peer. `socket_id` always names the
/// connection on the other end of the negotiation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "eventName",
    content = "data",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ServerSignal {
    GetPeers {
        you: ConnectionId,
        connections: Vec<ConnectionId>,
    },
    NewPeerConnected {
        socket_id: ConnectionId,
    },
    RemovePeerConnected {
        socket_id: ConnectionId,
    },
    ReceiveOffer {
        socket_id: ConnectionId,
        sdp: Value,
    },
    ReceiveAnswer {
        socket_id: ConnectionId,
        sdp: Value,
    },
    ReceiveIceCandidate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        socket_id: ConnectionId,
        candidate: Value,
    },
}

impl ServerSignal {
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerSignal::GetPeers { .. } => "get_peers",
            ServerSignal::NewPeerConnected { .. } => "new_peer_connected",
            ServerSignal::RemovePeerConnected { .. } => "remove_peer_connected",
            ServerSignal::ReceiveOffer { .. } => "receive_offer",
            ServerSignal::ReceiveAnswer { .. } => "receive_answer",
            ServerSignal::ReceiveIceCandidate { .. } => "receive_ice_candidate",
        }
    }
}
