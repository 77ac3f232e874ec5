//! Domain layer for the chat relay.
//!
//! This module contains business rules that are independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod factory;
pub mod pusher;
pub mod registry;
pub mod value_object;

pub use entity::{Member, RoomSummary};
pub use error::{PushError, RegistryError, ValueObjectError};
pub use factory::ConnectionIdFactory;
pub use pusher::MessagePusher;
pub use registry::MemberRegistry;
pub use value_object::{ConnectionId, DisplayName, MessageContent, RoomId, Timestamp};

#[cfg(test)]
pub use pusher::MockMessagePusher;
#[cfg(test)]
pub use registry::MockMemberRegistry;
