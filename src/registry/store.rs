//! Peer registry implementation
//!
//! The authoritative set of live connections. Every mutation and every
//! enumeration goes through one `RwLock`, so a snapshot or fan-out never
//! observes a half-applied join or leave.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tokio::sync::RwLock;

use super::entry::PeerHandle;
use super::error::RegistryError;
use super::id::PeerId;

/// Borrowed, locked view of the registry contents
///
/// Only obtainable while a registry lock is held, so everything done
/// through one view sees the same membership.
pub struct PeerView<'a> {
    peers: &'a HashMap<PeerId, PeerHandle>,
}

impl<'a> PeerView<'a> {
    fn new(peers: &'a HashMap<PeerId, PeerHandle>) -> Self {
        Self { peers }
    }

    /// Number of registered peers
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Check if no peers are registered
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Look up one peer's handle
    pub fn get(&self, id: &str) -> Option<&'a PeerHandle> {
        self.peers.get(id)
    }

    /// Ids of every peer except `exclude`, in no particular order
    pub fn ids_except(&self, exclude: Option<&str>) -> Vec<PeerId> {
        self.peers
            .keys()
            .filter(|id| Some(id.as_str()) != exclude)
            .cloned()
            .collect()
    }

    /// Call `f` for every peer except `exclude`
    ///
    /// Returns the number of peers visited.
    pub fn for_each_except<F>(&self, exclude: Option<&str>, mut f: F) -> usize
    where
        F: FnMut(&PeerId, &PeerHandle),
    {
        let mut visited = 0;
        for (id, handle) in self.peers {
            if Some(id.as_str()) == exclude {
                continue;
            }
            f(id, handle);
            visited += 1;
        }
        visited
    }
}

/// Registry of all live connections
///
/// Thread-safe via `RwLock`: lookups, snapshots and fan-outs share the read
/// side; joins and leaves take the write side.
pub struct PeerRegistry {
    /// Map of connection id to send handle
    peers: RwLock<HashMap<PeerId, PeerHandle>>,
}

impl PeerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            peers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a connection
    ///
    /// Returns an error, leaving the existing entry untouched, if `id` is
    /// already registered.
    pub async fn insert(&self, id: PeerId, handle: PeerHandle) -> Result<(), RegistryError> {
        self.insert_with(id, handle, |_, _| ()).await
    }

    /// Register a connection and run `f` before releasing the lock
    ///
    /// `f` sees the membership including the new entry and nothing else can
    /// join or leave until it returns. `f` must not block.
    pub async fn insert_with<F, R>(
        &self,
        id: PeerId,
        handle: PeerHandle,
        f: F,
    ) -> Result<R, RegistryError>
    where
        F: FnOnce(&PeerId, PeerView<'_>) -> R,
    {
        let mut peers = self.peers.write().await;

        let id = match peers.entry(id) {
            Entry::Occupied(entry) => {
                tracing::warn!(peer_id = %entry.key(), "Duplicate peer id rejected");
                return Err(RegistryError::DuplicatePeer(entry.key().clone()));
            }
            Entry::Vacant(entry) => {
                let id = entry.key().clone();
                entry.insert(handle);
                id
            }
        };

        tracing::debug!(peer_id = %id, peers = peers.len(), "Peer registered");

        Ok(f(&id, PeerView::new(&peers)))
    }

    /// Unregister a connection
    ///
    /// Idempotent: returns false if `id` was not registered.
    pub async fn remove(&self, id: &str) -> bool {
        self.remove_with(id, |_, _| ()).await.is_some()
    }

    /// Unregister a connection and run `f` before releasing the lock
    ///
    /// `f` sees the remaining membership. Returns `None` without calling `f`
    /// if `id` was not registered.
    pub async fn remove_with<F, R>(&self, id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&PeerId, PeerView<'_>) -> R,
    {
        let mut peers = self.peers.write().await;

        let (id, _handle) = peers.remove_entry(id)?;

        tracing::debug!(peer_id = %id, peers = peers.len(), "Peer unregistered");

        Some(f(&id, PeerView::new(&peers)))
    }

    /// Look up a connection's handle
    pub async fn get(&self, id: &str) -> Option<PeerHandle> {
        self.peers.read().await.get(id).cloned()
    }

    /// Check if an id is registered
    pub async fn contains(&self, id: &str) -> bool {
        self.peers.read().await.contains_key(id)
    }

    /// Ids of every connection except `exclude`, as of this call
    pub async fn snapshot_ids(&self, exclude: Option<&str>) -> Vec<PeerId> {
        let peers = self.peers.read().await;
        PeerView::new(&peers).ids_except(exclude)
    }

    /// Call `f` for every connection except `exclude`
    ///
    /// Joins and leaves wait until the iteration finishes. Returns the
    /// number of connections visited.
    pub async fn for_each_except<F>(&self, exclude: Option<&str>, f: F) -> usize
    where
        F: FnMut(&PeerId, &PeerHandle),
    {
        let peers = self.peers.read().await;
        PeerView::new(&peers).for_each_except(exclude, f)
    }

    /// Run `f` against a consistent read-locked view
    ///
    /// Use when several lookups must agree with each other. `f` must not
    /// block.
    pub async fn with_view<F, R>(&self, f: F) -> R
    where
        F: FnOnce(PeerView<'_>) -> R,
    {
        let peers = self.peers.read().await;
        f(PeerView::new(&peers))
    }

    /// Number of registered connections
    pub async fn len(&self) -> usize {
        self.peers.read().await.len()
    }

    /// Check if no connections are registered
    pub async fn is_empty(&self) -> bool {
        self.peers.read().await.is_empty()
    }
}

impl Default for PeerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;

    fn ids(list: &[&str]) -> HashSet<PeerId> {
        list.iter().map(|id| PeerId::from(*id)).collect()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let registry = PeerRegistry::new();
        let (handle, _rx) = PeerHandle::channel();

        registry.insert(PeerId::from("a"), handle.clone()).await.unwrap();

        let found = registry.get("a").await.unwrap();
        assert!(found.same_connection(&handle));
        assert!(registry.get("b").await.is_none());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_rejected() {
        let registry = PeerRegistry::new();
        let (first, _rx1) = PeerHandle::channel();
        let (second, _rx2) = PeerHandle::channel();

        registry.insert(PeerId::from("a"), first.clone()).await.unwrap();
        let result = registry.insert(PeerId::from("a"), second).await;

        assert_eq!(result, Err(RegistryError::DuplicatePeer(PeerId::from("a"))));
        // Original entry survives
        assert!(registry.get("a").await.unwrap().same_connection(&first));
    }

    #[tokio::test]
    async fn test_remove_idempotent() {
        let registry = PeerRegistry::new();
        let (handle, _rx) = PeerHandle::channel();

        registry.insert(PeerId::from("a"), handle).await.unwrap();

        assert!(registry.remove("a").await);
        assert!(!registry.remove("a").await);
        assert!(!registry.remove("never").await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_snapshot_excludes() {
        let registry = PeerRegistry::new();
        let mut receivers = Vec::new();
        for id in ["a", "b", "c"] {
            let (handle, rx) = PeerHandle::channel();
            receivers.push(rx);
            registry.insert(PeerId::from(id), handle).await.unwrap();
        }

        let others: HashSet<_> = registry.snapshot_ids(Some("a")).await.into_iter().collect();
        assert_eq!(others, ids(&["b", "c"]));

        let all: HashSet<_> = registry.snapshot_ids(None).await.into_iter().collect();
        assert_eq!(all, ids(&["a", "b", "c"]));
    }

    #[tokio::test]
    async fn test_for_each_except() {
        let registry = PeerRegistry::new();
        let mut receivers = Vec::new();
        for id in ["a", "b", "c"] {
            let (handle, rx) = PeerHandle::channel();
            receivers.push(rx);
            registry.insert(PeerId::from(id), handle).await.unwrap();
        }

        let mut seen = HashSet::new();
        let visited = registry
            .for_each_except(Some("b"), |id, _| {
                seen.insert(id.clone());
            })
            .await;

        assert_eq!(visited, 2);
        assert_eq!(seen, ids(&["a", "c"]));
    }

    #[tokio::test]
    async fn test_insert_with_sees_new_entry() {
        let registry = PeerRegistry::new();
        let (a, _rx_a) = PeerHandle::channel();
        let (b, _rx_b) = PeerHandle::channel();

        registry.insert(PeerId::from("a"), a).await.unwrap();
        let others = registry
            .insert_with(PeerId::from("b"), b, |id, view| {
                assert_eq!(view.len(), 2);
                view.ids_except(Some(id.as_str()))
            })
            .await
            .unwrap();

        assert_eq!(others, vec![PeerId::from("a")]);
    }

    #[tokio::test]
    async fn test_remove_with_sees_remaining() {
        let registry = PeerRegistry::new();
        for id in ["a", "b"] {
            let (handle, _rx) = PeerHandle::channel();
            registry.insert(PeerId::from(id), handle).await.unwrap();
        }

        let remaining = registry
            .remove_with("a", |_, view| view.ids_except(None))
            .await;
        assert_eq!(remaining, Some(vec![PeerId::from("b")]));

        let again = registry.remove_with("a", |_, view| view.len()).await;
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_joins_unique() {
        let registry = Arc::new(PeerRegistry::new());
        let mut tasks = Vec::new();

        for n in 0..64 {
            let registry = Arc::clone(&registry);
            tasks.push(tokio::spawn(async move {
                let (handle, rx) = PeerHandle::channel();
                registry
                    .insert(PeerId::new(format!("peer-{}", n % 32)), handle)
                    .await
                    .map(|_| rx)
            }));
        }

        let mut accepted = 0;
        let mut rejected = 0;
        let mut receivers = Vec::new();
        for task in tasks {
            match task.await.unwrap() {
                Ok(rx) => {
                    accepted += 1;
                    receivers.push(rx);
                }
                Err(RegistryError::DuplicatePeer(_)) => rejected += 1,
            }
        }

        assert_eq!(accepted, 32);
        assert_eq!(rejected, 32);
        assert_eq!(registry.len().await, 32);
    }
}
