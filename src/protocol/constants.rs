//! Signaling protocol constants
//!
//! Literal tags and field names used on the wire.

/// Envelope field naming the unicast target
pub const FIELD_TO: &str = "to";
/// Envelope field carrying the sender-asserted id
pub const FIELD_FROM: &str = "from";
/// Envelope field carrying the message tag
pub const FIELD_TYPE: &str = "type";
/// Envelope field carrying the application payload
pub const FIELD_DATA: &str = "data";

/// Sent to a newly connected peer with its id and the current peer list
pub const TYPE_WELCOME: &str = "welcome";
/// Announces a newly connected peer to everyone else
pub const TYPE_NEW_PEER: &str = "new-peer";
/// Announces a disconnected peer to everyone remaining
pub const TYPE_PEER_LEFT: &str = "peer-left";
/// Fan-out to every peer except the payload's `from`
pub const TYPE_BROADCAST: &str = "broadcast";
/// Tag carried by the peers query response
pub const TYPE_UNKNOWN: &str = "unknown";

/// `data` value that turns a frame into a peer list query
pub const PEERS_REQUEST: &str = "peers-request";
/// `data` value of the peer list query response
pub const PEERS_RESPONSE: &str = "peers-response";

/// Default WebSocket upgrade path
pub const DEFAULT_PATH: &str = "/ws";
/// Default listening port
pub const DEFAULT_PORT: u16 = 8080;
