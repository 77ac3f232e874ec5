//! Membership registry port.
//!
//! The single source of truth for "who is where". Implementations must make
//! the duplicate-name check in [`MemberRegistry::add`] atomic with the
//! insertion, and every read must return an owned snapshot.

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::{
    entity::{Member, RoomSummary},
    error::RegistryError,
    value_object::{ConnectionId, DisplayName, RoomId, Timestamp},
};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait MemberRegistry: Send + Sync {
    /// Bind `connection_id` to `room_id` under `display_name`.
    ///
    /// # Errors
    ///
    /// * `RegistryError::AlreadyJoined` - the connection already has a member
    /// * `RegistryError::DuplicateName` - a present member of the room uses the name
    async fn add(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
        display_name: DisplayName,
        joined_at: Timestamp,
    ) -> Result<Member, RegistryError>;

    /// Remove and return the member bound to `connection_id`, if any.
    async fn remove(&self, connection_id: &ConnectionId) -> Option<Member>;

    /// Look up the member bound to `connection_id`.
    ///
    /// # Errors
    ///
    /// * `RegistryError::Inconsistent` - the member is missing from its room index
    async fn find_by_connection(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Option<Member>, RegistryError>;

    /// Members of `room_id` in join order.
    async fn members_of(&self, room_id: &RoomId) -> Vec<Member>;

    /// Members of `room_id` in join order, without `excluded`.
    async fn members_of_except(&self, room_id: &RoomId, excluded: &ConnectionId) -> Vec<Member>;

    /// All non-empty rooms, sorted by id.
    async fn list_rooms(&self) -> Vec<RoomSummary>;

    /// Total number of present members.
    async fn count_members(&self) -> usize;
}
