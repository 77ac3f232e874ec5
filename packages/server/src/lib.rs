//! Room-scoped WebSocket chat relay.
//!
//! Clients open a WebSocket, join a named room under a display name, and
//! exchange chat and typing events with every other member of that room.
//! All state lives in memory for the lifetime of the process.

pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use ui::{ServerConfig, run};
