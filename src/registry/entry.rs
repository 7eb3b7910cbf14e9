//! Peer send handles
//!
//! A handle is the registry's view of a connection: something that accepts
//! outbound text frames. The connection's writer task owns the receiving
//! end and drains it into the socket; once that task is gone the handle
//! reports closed and every send fails fast.

use tokio::sync::mpsc;

/// Send attempted on a connection that is no longer open
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendError;

impl std::fmt::Display for SendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Peer connection closed")
    }
}

impl std::error::Error for SendError {}

/// Cloneable outbound handle for one connection
#[derive(Debug, Clone)]
pub struct PeerHandle {
    tx: mpsc::UnboundedSender<String>,
}

impl PeerHandle {
    /// Create a handle and the receiver its frames arrive on
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue a text frame for delivery
    ///
    /// Never blocks. Fails if the receiving side has been dropped.
    pub fn send(&self, text: impl Into<String>) -> Result<(), SendError> {
        self.tx.send(text.into()).map_err(|_| SendError)
    }

    /// Check if the connection can still accept frames
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Check if two handles point at the same connection
    pub fn same_connection(&self, other: &PeerHandle) -> bool {
        self.tx.same_channel(&other.tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_and_receive() {
        let (handle, mut rx) = PeerHandle::channel();

        assert!(handle.is_open());
        handle.send("hello").unwrap();

        assert_eq!(rx.recv().await.as_deref(), Some("hello"));
    }

    #[test]
    fn test_send_after_close() {
        let (handle, rx) = PeerHandle::channel();
        drop(rx);

        assert!(!handle.is_open());
        assert_eq!(handle.send("late"), Err(SendError));
    }

    #[test]
    fn test_clones_share_connection() {
        let (a, _rx_a) = PeerHandle::channel();
        let (b, _rx_b) = PeerHandle::channel();

        assert!(a.same_connection(&a.clone()));
        assert!(!a.same_connection(&b));
    }
}
