//! Connection context
//!
//! Per-connection information carried by the connection task for logging
//! and lifetime accounting.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use crate::registry::PeerId;

/// Context for one accepted connection
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Remote peer address
    pub peer_addr: SocketAddr,

    /// Relay-assigned id (set once registered)
    pub peer_id: Option<PeerId>,

    /// When the TCP connection was accepted
    pub connected_at: Instant,

    /// Inbound frames processed
    pub frames_received: u64,
}

impl SessionContext {
    /// Create a new context
    pub fn new(peer_addr: SocketAddr) -> Self {
        Self {
            peer_addr,
            peer_id: None,
            connected_at: Instant::now(),
            frames_received: 0,
        }
    }

    /// Record the assigned id
    pub fn registered(&mut self, peer_id: PeerId) {
        self.peer_id = Some(peer_id);
    }

    /// Id as a string, empty before registration
    pub fn peer_id_str(&self) -> &str {
        self.peer_id.as_ref().map(PeerId::as_str).unwrap_or("")
    }

    /// Time since the connection was accepted
    pub fn duration(&self) -> Duration {
        self.connected_at.elapsed()
    }
}
