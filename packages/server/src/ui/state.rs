//! Server state shared by every handler.

use std::sync::Arc;

use crate::{
    domain::MemberRegistry,
    infrastructure::{connection::ConnectionTable, registry::InMemoryMemberRegistry},
    usecase::RoomRelay,
};

/// Shared application state
pub struct AppState {
    /// Registry（メンバー管理の抽象化）
    pub registry: Arc<dyn MemberRegistry>,
    /// Outbound channels of every open socket
    pub connections: Arc<ConnectionTable>,
    /// Protocol state machine fed by the WebSocket handler
    pub relay: RoomRelay,
}

impl AppState {
    /// Wire the relay to the given registry and connection table.
    pub fn new(registry: Arc<dyn MemberRegistry>, connections: Arc<ConnectionTable>) -> Self {
        let relay = RoomRelay::new(registry.clone(), connections.clone());
        Self {
            registry,
            connections,
            relay,
        }
    }

    /// Fresh in-memory state. Restarting the process loses every room.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryMemberRegistry::new()),
            Arc::new(ConnectionTable::new()),
        )
    }
}
