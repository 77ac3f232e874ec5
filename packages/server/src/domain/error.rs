//! Domain layer error definitions.

use thiserror::Error;

use super::value_object::{ConnectionId, DisplayName, RoomId};

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// RoomId validation error
    #[error("RoomId cannot be empty")]
    RoomIdEmpty,

    /// RoomId too long error
    #[error("RoomId cannot exceed {max} characters (got {actual})")]
    RoomIdTooLong { max: usize, actual: usize },

    /// DisplayName validation error
    #[error("DisplayName cannot be empty")]
    DisplayNameEmpty,

    /// DisplayName too long error
    #[error("DisplayName cannot exceed {max} characters (got {actual})")]
    DisplayNameTooLong { max: usize, actual: usize },

    /// MessageContent validation error
    #[error("MessageContent cannot be empty")]
    MessageContentEmpty,

    /// MessageContent too long error
    #[error("MessageContent cannot exceed {max} characters (got {actual})")]
    MessageContentTooLong { max: usize, actual: usize },
}

/// Errors returned by a [`MemberRegistry`](super::MemberRegistry)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Another present member of the room already uses this name
    #[error("display name '{name}' is already taken in room '{room_id}'")]
    DuplicateName { room_id: RoomId, name: DisplayName },

    /// The connection is already bound to a member
    #[error("connection {connection_id} has already joined room '{room_id}'")]
    AlreadyJoined {
        connection_id: ConnectionId,
        room_id: RoomId,
    },

    /// The by-connection and by-room indexes disagree about a connection
    #[error("registry indexes disagree about connection {0}")]
    Inconsistent(ConnectionId),
}

/// Errors returned by a [`MessagePusher`](super::MessagePusher)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PushError {
    /// No outbound channel is registered for the connection
    #[error("connection {0} is not registered")]
    ConnectionNotFound(ConnectionId),

    /// The outbound channel exists but its receiving side is gone
    #[error("connection {0} is closed")]
    ConnectionClosed(ConnectionId),
}
