use crate::model::room::RoomName;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Periodic resource report a donor posts to the broker's HTTP surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceReport {
    pub room_name: RoomName,
    #[serde(default)]
    pub available_cpu: String,
    #[serde(default)]
    pub available_memory: String,
    #[serde(default)]
    pub available_disk: String,
    #[serde(default)]
    pub containers: Value,
    /// Milliseconds since the Unix epoch, stamped by the broker on receipt.
    #[serde(default)]
    pub last_updated: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub room_name: RoomName,
    pub members: usize,
}
