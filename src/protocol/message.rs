//! Relay-generated messages

use serde_json::{json, Value};

use super::constants::{PEERS_RESPONSE, TYPE_NEW_PEER, TYPE_PEER_LEFT, TYPE_UNKNOWN, TYPE_WELCOME};
use crate::registry::PeerId;

/// Messages the relay originates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Sent once to a new connection
    Welcome {
        /// Id assigned to the receiving connection
        peer_id: PeerId,
        /// Everyone else connected at join time
        peers: Vec<PeerId>,
    },
    /// A peer joined
    NewPeer { peer_id: PeerId },
    /// A peer disconnected
    PeerLeft { peer_id: PeerId },
    /// Reply to a `peers-request` query
    PeersResponse { peers: Vec<PeerId> },
}

impl ServerMessage {
    /// JSON representation
    pub fn to_json(&self) -> Value {
        match self {
            ServerMessage::Welcome { peer_id, peers } => json!({
                "type": TYPE_WELCOME,
                "peerId": peer_id,
                "peers": peers,
            }),
            ServerMessage::NewPeer { peer_id } => json!({
                "type": TYPE_NEW_PEER,
                "peerId": peer_id,
            }),
            ServerMessage::PeerLeft { peer_id } => json!({
                "type": TYPE_PEER_LEFT,
                "peerId": peer_id,
            }),
            ServerMessage::PeersResponse { peers } => json!({
                "type": TYPE_UNKNOWN,
                "data": PEERS_RESPONSE,
                "peers": peers,
            }),
        }
    }

    /// Serialized text frame
    pub fn to_text(&self) -> String {
        self.to_json().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome() {
        let msg = ServerMessage::Welcome {
            peer_id: PeerId::from("a"),
            peers: vec![PeerId::from("b"), PeerId::from("c")],
        };

        assert_eq!(
            msg.to_json(),
            json!({"type": "welcome", "peerId": "a", "peers": ["b", "c"]})
        );
    }

    #[test]
    fn test_welcome_alone() {
        let msg = ServerMessage::Welcome {
            peer_id: PeerId::from("a"),
            peers: Vec::new(),
        };

        assert_eq!(msg.to_json()["peers"], json!([]));
    }

    #[test]
    fn test_lifecycle_notices() {
        let joined = ServerMessage::NewPeer {
            peer_id: PeerId::from("a"),
        };
        let left = ServerMessage::PeerLeft {
            peer_id: PeerId::from("a"),
        };

        assert_eq!(joined.to_json(), json!({"type": "new-peer", "peerId": "a"}));
        assert_eq!(left.to_json(), json!({"type": "peer-left", "peerId": "a"}));
    }

    #[test]
    fn test_peers_response() {
        let msg = ServerMessage::PeersResponse {
            peers: vec![PeerId::from("b")],
        };
        let parsed: Value = serde_json::from_str(&msg.to_text()).unwrap();

        assert_eq!(parsed["type"], "unknown");
        assert_eq!(parsed["data"], "peers-response");
        assert_eq!(parsed["peers"], json!(["b"]));
    }
}
