//! Registry error types

use super::id::PeerId;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Id is already assigned to a live connection
    DuplicatePeer(PeerId),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::DuplicatePeer(id) => write!(f, "Peer id already registered: {}", id),
        }
    }
}

impl std::error::Error for RegistryError {}
