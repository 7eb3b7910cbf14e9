//! Dispatch outcomes
//!
//! What happened to one inbound frame. Nothing here is ever reported back to
//! the sending client; outcomes exist for logging, stats and tests.

use crate::registry::PeerId;

/// Why a frame was not delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Frame was not a JSON object
    Malformed,
    /// No registered `to` and not a broadcast
    Unroutable,
    /// Target resolved but its connection was already closing
    StaleRecipient,
}

/// Result of routing one inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Peer list query answered to the sender
    PeersResponse {
        /// Number of peers listed
        peers: usize,
    },
    /// Frame forwarded to one peer
    Unicast {
        /// Recipient
        to: PeerId,
    },
    /// Frame fanned out
    Broadcast {
        /// Recipients that accepted the frame
        delivered: usize,
    },
    /// Frame dropped
    Dropped(DropReason),
}

impl Dispatch {
    /// Check if the frame reached at least one peer
    pub fn is_delivered(&self) -> bool {
        match self {
            Dispatch::PeersResponse { .. } | Dispatch::Unicast { .. } => true,
            Dispatch::Broadcast { delivered } => *delivered > 0,
            Dispatch::Dropped(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_delivered() {
        assert!(Dispatch::PeersResponse { peers: 0 }.is_delivered());
        assert!(Dispatch::Unicast {
            to: PeerId::from("b")
        }
        .is_delivered());
        assert!(Dispatch::Broadcast { delivered: 1 }.is_delivered());
        assert!(!Dispatch::Broadcast { delivered: 0 }.is_delivered());
        assert!(!Dispatch::Dropped(DropReason::Malformed).is_delivered());
    }
}
