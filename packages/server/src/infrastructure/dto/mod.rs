//! Data transfer objects for the wire (WebSocket frames) and the HTTP API.

pub mod http;
pub mod websocket;

pub use websocket::{ClientFrame, FrameError, ServerFrame};
