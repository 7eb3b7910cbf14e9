//! WebSocket server
//!
//! Transport glue: accepts TCP connections, performs the WebSocket upgrade
//! on the configured path, and bridges frames to the signaling router.

pub mod config;
pub mod connection;
pub mod listener;

pub use config::ServerConfig;
pub use listener::SignalServer;
