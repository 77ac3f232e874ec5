//! Outbound delivery port.

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::{error::PushError, value_object::ConnectionId};

/// Sends one serialized frame to one connection.
///
/// Delivery is fire-and-forget: implementations must fail fast instead of
/// waiting on a slow or dead peer.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    async fn push(&self, connection_id: &ConnectionId, frame: &str) -> Result<(), PushError>;
}
