use std::collections::HashMap;
use vt_core::{ConnectionId, RoomName, RoomSummary};

/// Room membership owned by the broker event loop.
///
/// A connection belongs to at most one room; rooms exist only while they
/// have members.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomName, Vec<ConnectionId>>,
    membership: HashMap<ConnectionId, RoomName>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    /// Members that were already in the room, in join order.
    pub existing: Vec<ConnectionId>,
    /// Set when the connection left another room to join this one.
    pub previous: Option<LeaveOutcome>,
    /// The connection was already a member of this room.
    pub rejoined: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveOutcome {
    pub room: RoomName,
    pub remaining: Vec<ConnectionId>,
    pub room_dropped: bool,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&mut self, room: RoomName, connection_id: ConnectionId) -> JoinOutcome {
        if self.membership.get(&connection_id) == Some(&room) {
            return JoinOutcome {
                existing: self.others(&room, &connection_id),
                previous: None,
                rejoined: true,
            };
        }

        let previous = self.leave(&connection_id);

        let members = self.rooms.entry(room.clone()).or_default();
        let existing = members.clone();
        members.push(connection_id.clone());
        self.membership.insert(connection_id, room);

        JoinOutcome {
            existing,
            previous,
            rejoined: false,
        }
    }

    pub fn leave(&mut self, connection_id: &ConnectionId) -> Option<LeaveOutcome> {
        let room = self.membership.remove(connection_id)?;
        let members = self.rooms.get_mut(&room)?;
        members.retain(|member| member != connection_id);

        let remaining = members.clone();
        let room_dropped = remaining.is_empty();
        if room_dropped {
            self.rooms.remove(&room);
        }

        Some(LeaveOutcome {
            room,
            remaining,
            room_dropped,
        })
    }

    pub fn room_of(&self, connection_id: &ConnectionId) -> Option<&RoomName> {
        self.membership.get(connection_id)
    }

    pub fn members(&self, room: &RoomName) -> &[ConnectionId] {
        self.rooms.get(room).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn others(&self, room: &RoomName, connection_id: &ConnectionId) -> Vec<ConnectionId> {
        self.members(room)
            .iter()
            .filter(|member| *member != connection_id)
            .cloned()
            .collect()
    }

    pub fn contains_room(&self, room: &RoomName) -> bool {
        self.rooms.contains_key(room)
    }

    pub fn summaries(&self) -> Vec<RoomSummary> {
        let mut summaries: Vec<RoomSummary> = self
            .rooms
            .iter()
            .map(|(room, members)| RoomSummary {
                room_name: room.clone(),
                members: members.len(),
            })
            .collect();
        summaries.sort_by(|a, b| a.room_name.cmp(&b.room_name));
        summaries
    }
}
