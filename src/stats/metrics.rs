//! Statistics and metrics for the relay

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Live relay counters
///
/// Updated lock-free from every connection task.
#[derive(Debug)]
pub struct RelayStats {
    started_at: Instant,
    total_connections: AtomicU64,
    active_connections: AtomicU64,
    frames_received: AtomicU64,
    malformed_frames: AtomicU64,
    unroutable_frames: AtomicU64,
    unicast_delivered: AtomicU64,
    broadcasts: AtomicU64,
    peers_requests: AtomicU64,
    stale_recipients: AtomicU64,
}

/// Point-in-time copy of [`RelayStats`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayStatsSnapshot {
    /// Connections ever accepted
    pub total_connections: u64,
    /// Connections currently registered
    pub active_connections: u64,
    /// Inbound frames seen
    pub frames_received: u64,
    /// Frames dropped because they did not parse
    pub malformed_frames: u64,
    /// Frames dropped because they had no known target
    pub unroutable_frames: u64,
    /// Unicast frames handed to a recipient
    pub unicast_delivered: u64,
    /// Broadcast frames fanned out
    pub broadcasts: u64,
    /// Peer list queries answered
    pub peers_requests: u64,
    /// Deliveries skipped because the recipient was already closed
    pub stale_recipients: u64,
    /// Time since the stats were created
    pub uptime: Duration,
}

impl RelayStats {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            total_connections: AtomicU64::new(0),
            active_connections: AtomicU64::new(0),
            frames_received: AtomicU64::new(0),
            malformed_frames: AtomicU64::new(0),
            unroutable_frames: AtomicU64::new(0),
            unicast_delivered: AtomicU64::new(0),
            broadcasts: AtomicU64::new(0),
            peers_requests: AtomicU64::new(0),
            stale_recipients: AtomicU64::new(0),
        }
    }

    pub(crate) fn connection_opened(&self) {
        self.total_connections.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn connection_closed(&self) {
        // Never underflow even if close is reported twice
        let _ = self
            .active_connections
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    pub(crate) fn frame_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn malformed(&self) {
        self.malformed_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn unroutable(&self) {
        self.unroutable_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn unicast(&self) {
        self.unicast_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn broadcast(&self) {
        self.broadcasts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn peers_request(&self) {
        self.peers_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn stale_recipient(&self) {
        self.stale_recipients.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current counter values
    pub fn snapshot(&self) -> RelayStatsSnapshot {
        RelayStatsSnapshot {
            total_connections: self.total_connections.load(Ordering::Relaxed),
            active_connections: self.active_connections.load(Ordering::Relaxed),
            frames_received: self.frames_received.load(Ordering::Relaxed),
            malformed_frames: self.malformed_frames.load(Ordering::Relaxed),
            unroutable_frames: self.unroutable_frames.load(Ordering::Relaxed),
            unicast_delivered: self.unicast_delivered.load(Ordering::Relaxed),
            broadcasts: self.broadcasts.load(Ordering::Relaxed),
            peers_requests: self.peers_requests.load(Ordering::Relaxed),
            stale_recipients: self.stale_recipients.load(Ordering::Relaxed),
            uptime: self.started_at.elapsed(),
        }
    }
}

impl Default for RelayStats {
    fn default() -> Self {
        Self::new()
    }
}
