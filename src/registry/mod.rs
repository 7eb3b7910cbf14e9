//! Peer registry
//!
//! The registry owns the set of live connections and their send handles.
//! Nothing outside it ever touches the underlying map; callers go through
//! point lookups, snapshots, and fan-out iteration.
//!
//! # Architecture
//!
//! ```text
//!                          Arc<PeerRegistry>
//!                     ┌─────────────────────────┐
//!                     │ peers: HashMap<PeerId,  │
//!                     │   PeerHandle {          │
//!                     │     tx: mpsc::Tx,       │
//!                     │   }                     │
//!                     │ >                       │
//!                     └───────────┬─────────────┘
//!                                 │
//!         ┌───────────────────────┼───────────────────────┐
//!         │                       │                       │
//!         ▼                       ▼                       ▼
//!    [Connection]            [Connection]            [Connection]
//!    router.handle_message() rx.recv()               rx.recv()
//!         │                       │                       │
//!         └──► registry.for_each_except() ──► handle.send() ──► WebSocket
//! ```
//!
//! # Consistency
//!
//! Joins and leaves are announced from inside the write lock
//! (`insert_with` / `remove_with`), so every peer sees each join or leave
//! exactly once and never both a welcome listing and a separate join notice
//! for the same peer.

pub mod entry;
pub mod error;
pub mod id;
pub mod store;

pub use entry::{PeerHandle, SendError};
pub use error::RegistryError;
pub use id::{IdGenerator, PeerId, SequentialIds, UuidGenerator};
pub use store::{PeerRegistry, PeerView};
