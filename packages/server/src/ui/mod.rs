//! WebSocket chat relay server: HTTP/WebSocket handlers, state, and runner.

pub mod config;
mod handler;
mod runner;
mod signal;
pub mod state;

pub use config::ServerConfig;
pub use runner::{ServerError, build_router, run, serve};
pub use signal::shutdown_signal;
pub use state::AppState;
