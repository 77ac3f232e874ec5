//! Core domain models for the chat relay.

use serde::{Deserialize, Serialize};

use super::value_object::{ConnectionId, DisplayName, RoomId, Timestamp};

/// Binding of one live connection to a room under a display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Connection this member speaks through
    pub connection_id: ConnectionId,
    /// Room the member joined
    pub room_id: RoomId,
    /// Name shown to the other members of the room
    pub display_name: DisplayName,
    /// Timestamp when the join succeeded
    pub joined_at: Timestamp,
}

impl Member {
    /// Create a new member
    pub fn new(
        connection_id: ConnectionId,
        room_id: RoomId,
        display_name: DisplayName,
        joined_at: Timestamp,
    ) -> Self {
        Self {
            connection_id,
            room_id,
            display_name,
            joined_at,
        }
    }

    /// Whether this member is bound to the given connection
    pub fn is_connection(&self, connection_id: &ConnectionId) -> bool {
        &self.connection_id == connection_id
    }
}

/// Snapshot of one non-empty room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    /// Room identifier
    pub id: RoomId,
    /// Members in join order
    pub members: Vec<Member>,
}

impl RoomSummary {
    /// Number of members currently in the room
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}
