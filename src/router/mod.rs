//! Signaling router
//!
//! Protocol logic on top of the peer registry: id assignment and the
//! welcome/discovery handshake on connect, unicast/broadcast/query dispatch
//! for inbound frames, and leave notifications on disconnect.
//!
//! Routing order for an inbound frame:
//!
//! 1. unparsable → dropped
//! 2. `data == "peers-request"` → peer list sent back to the sender only
//! 3. `to` names a registered peer → original frame to that peer
//! 4. `type == "broadcast"` → original frame to everyone except `from`
//! 5. anything else → dropped

pub mod dispatch;
pub mod signaling;

pub use dispatch::{Dispatch, DropReason};
pub use signaling::SignalingRouter;
