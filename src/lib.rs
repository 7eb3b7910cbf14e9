//! WebRTC signaling relay
//!
//! A rendezvous server that lets peers discover each other and exchange
//! opaque handshake messages (SDP offers/answers, ICE candidates) over
//! WebSocket. The relay never looks inside the payload; it tracks who is
//! connected and routes envelopes one-to-one or one-to-many.
//!
//! # Example
//! ```no_run
//! use signal_relay::{ServerConfig, SignalServer};
//!
//! # async fn example() -> signal_relay::error::Result<()> {
//! let server = SignalServer::new(ServerConfig::from_env());
//! server.run().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Protocol
//!
//! On connect a client receives `{"type":"welcome","peerId":..,"peers":[..]}`
//! and everyone else receives `{"type":"new-peer","peerId":..}`. Frames with a
//! `to` naming a connected peer are forwarded to it unchanged; frames with
//! `"type":"broadcast"` go to everyone except their `from`. Sending
//! `{"data":"peers-request"}` returns the current peer list. On disconnect the
//! remaining peers receive `{"type":"peer-left","peerId":..}`.

pub mod error;
pub mod protocol;
pub mod registry;
pub mod router;
pub mod server;
pub mod session;
pub mod stats;

pub use error::{Error, Result};
pub use registry::{IdGenerator, PeerHandle, PeerId, PeerRegistry};
pub use router::{Dispatch, DropReason, SignalingRouter};
pub use server::{ServerConfig, SignalServer};
