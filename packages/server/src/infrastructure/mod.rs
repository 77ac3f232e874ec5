//! Infrastructure layer: wire DTOs, the in-memory registry, and the
//! connection table that delivers frames to sockets.

pub mod connection;
pub mod dto;
pub mod registry;
