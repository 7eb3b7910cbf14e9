//! Connection ids
//!
//! Ids are always minted by the relay, never accepted from clients.

use std::borrow::Borrow;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Opaque id of one live connection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    /// Create a peer id from any string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PeerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for PeerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PeerId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for PeerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Source of fresh connection ids
pub trait IdGenerator: Send + Sync + 'static {
    /// Produce an id not currently assigned to any connection
    fn generate(&self) -> PeerId;
}

/// Random v4 UUIDs (default)
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> PeerId {
        PeerId(uuid::Uuid::new_v4().to_string())
    }
}

/// Predictable ids (`peer-1`, `peer-2`, ...)
///
/// Handy for demos and tests where readable ids matter more than
/// unguessable ones.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    /// Create a generator with the default `peer` prefix
    pub fn new() -> Self {
        Self::with_prefix("peer")
    }

    /// Create a generator with a custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn generate(&self) -> PeerId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        PeerId(format!("{}-{}", self.prefix, n))
    }
}
