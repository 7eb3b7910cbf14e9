//! Signaling wire protocol
//!
//! Inbound frames are JSON objects with optional `to`, `from`, `type` and
//! `data` fields. The relay only looks at those four; everything else is
//! application payload and is forwarded untouched.
//!
//! Outbound frames generated by the relay itself are the lifecycle
//! announcements (`welcome`, `new-peer`, `peer-left`) and the reply to a
//! `peers-request` query.

pub mod constants;
pub mod envelope;
pub mod message;

pub use envelope::{Envelope, ParseError};
pub use message::ServerMessage;
