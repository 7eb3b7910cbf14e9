//! Connection lifecycle and message dispatch

use std::sync::Arc;

use crate::error::Result;
use crate::protocol::{Envelope, ServerMessage};
use crate::registry::{IdGenerator, PeerHandle, PeerId, PeerRegistry, PeerView, UuidGenerator};
use crate::stats::RelayStats;

use super::dispatch::{Dispatch, DropReason};

/// Routes signaling frames between registered peers
///
/// Shared by every connection task behind an `Arc`. All state lives in the
/// registry; the router itself is immutable.
pub struct SignalingRouter {
    registry: Arc<PeerRegistry>,
    ids: Arc<dyn IdGenerator>,
    stats: Arc<RelayStats>,
}

impl SignalingRouter {
    /// Create a router over an existing registry
    pub fn new(registry: Arc<PeerRegistry>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            registry,
            ids,
            stats: Arc::new(RelayStats::new()),
        }
    }

    /// Create a router with an empty registry and UUID ids
    pub fn with_defaults() -> Self {
        Self::new(Arc::new(PeerRegistry::new()), Arc::new(UuidGenerator))
    }

    /// Get the peer registry
    pub fn registry(&self) -> &Arc<PeerRegistry> {
        &self.registry
    }

    /// Get the relay counters
    pub fn stats(&self) -> &Arc<RelayStats> {
        &self.stats
    }

    /// Register a new connection
    ///
    /// Assigns an id, sends the connection its welcome, and announces it to
    /// everyone already present. All three happen under the registry's
    /// write lock, so concurrent joins each see the other exactly once.
    pub async fn connect(&self, handle: PeerHandle) -> Result<PeerId> {
        let id = self.ids.generate();
        let stats = &self.stats;

        let (existing, notified) = self
            .registry
            .insert_with(id.clone(), handle.clone(), |id, view| {
                let peers = view.ids_except(Some(id.as_str()));
                let existing = peers.len();

                let welcome = ServerMessage::Welcome {
                    peer_id: id.clone(),
                    peers,
                };
                deliver(id.as_str(), &handle, &welcome.to_text(), stats);

                let notified = if existing > 0 {
                    let notice = ServerMessage::NewPeer {
                        peer_id: id.clone(),
                    };
                    deliver_except(&view, Some(id.as_str()), &notice.to_text(), stats)
                } else {
                    0
                };

                (existing, notified)
            })
            .await?;

        self.stats.connection_opened();

        tracing::info!(
            peer_id = %id,
            existing = existing,
            notified = notified,
            "Peer joined"
        );

        Ok(id)
    }

    /// Unregister a closed connection and tell everyone left
    ///
    /// Returns false, sending nothing, if the id was already gone.
    pub async fn disconnect(&self, id: &str) -> bool {
        let stats = &self.stats;

        let notified = self
            .registry
            .remove_with(id, |id, view| {
                let notice = ServerMessage::PeerLeft {
                    peer_id: id.clone(),
                };
                deliver_except(&view, None, &notice.to_text(), stats)
            })
            .await;

        match notified {
            Some(notified) => {
                self.stats.connection_closed();
                tracing::info!(peer_id = %id, notified = notified, "Peer left");
                true
            }
            None => {
                tracing::debug!(peer_id = %id, "Disconnect for unknown peer ignored");
                false
            }
        }
    }

    /// Record a transport error
    ///
    /// Does not unregister the peer. A WebSocket stream cannot be read after
    /// an error though, so the connection task ends its reader loop and the
    /// peer is removed through [`disconnect`](Self::disconnect) like any
    /// other close.
    pub fn on_error(&self, id: &str, reason: impl std::fmt::Display) {
        tracing::warn!(peer_id = %id, error = %reason, "Transport error");
    }

    /// Route one inbound text frame from `sender`
    pub async fn handle_message(&self, sender: &str, text: &str) -> Dispatch {
        self.stats.frame_received();

        let envelope = match Envelope::parse(text) {
            Ok(envelope) => envelope,
            Err(e) => {
                self.stats.malformed();
                tracing::debug!(peer_id = %sender, error = %e, "Dropping malformed frame");
                return Dispatch::Dropped(DropReason::Malformed);
            }
        };

        if envelope.is_peers_request() {
            return self.answer_peers_request(sender).await;
        }

        if let Some(to) = envelope.to.as_deref() {
            if let Some(handle) = self.registry.get(to).await {
                return self.unicast(sender, to, &handle, &envelope);
            }
        }

        if envelope.is_broadcast() {
            return self.broadcast(sender, &envelope).await;
        }

        self.stats.unroutable();
        tracing::debug!(
            peer_id = %sender,
            to = ?envelope.to,
            kind = ?envelope.kind,
            "Unknown recipient or message"
        );
        Dispatch::Dropped(DropReason::Unroutable)
    }

    async fn answer_peers_request(&self, sender: &str) -> Dispatch {
        let stats = &self.stats;

        let listed = self
            .registry
            .with_view(|view| {
                let handle = view.get(sender)?;
                let peers = view.ids_except(Some(sender));
                let listed = peers.len();

                let reply = ServerMessage::PeersResponse { peers };
                deliver(sender, handle, &reply.to_text(), stats).then_some(listed)
            })
            .await;

        match listed {
            Some(peers) => {
                self.stats.peers_request();
                tracing::debug!(peer_id = %sender, peers = peers, "Answered peers request");
                Dispatch::PeersResponse { peers }
            }
            None => Dispatch::Dropped(DropReason::StaleRecipient),
        }
    }

    fn unicast(&self, sender: &str, to: &str, handle: &PeerHandle, envelope: &Envelope) -> Dispatch {
        if !deliver(to, handle, envelope.raw(), &self.stats) {
            return Dispatch::Dropped(DropReason::StaleRecipient);
        }

        self.stats.unicast();
        tracing::debug!(peer_id = %sender, to = %to, kind = ?envelope.kind, "Unicast");
        Dispatch::Unicast {
            to: PeerId::from(to),
        }
    }

    async fn broadcast(&self, sender: &str, envelope: &Envelope) -> Dispatch {
        // Exclusion follows the payload's own `from`, not the connection.
        // A frame without `from` reaches the sender too.
        let exclude = envelope.from.as_deref();
        if exclude != Some(sender) {
            tracing::debug!(
                peer_id = %sender,
                from = ?exclude,
                "Broadcast `from` does not match sender"
            );
        }

        let stats = &self.stats;
        let raw = envelope.raw();
        let mut delivered = 0;
        self.registry
            .for_each_except(exclude, |id, handle| {
                if deliver(id.as_str(), handle, raw, stats) {
                    delivered += 1;
                }
            })
            .await;

        self.stats.broadcast();
        tracing::debug!(peer_id = %sender, delivered = delivered, "Broadcast");
        Dispatch::Broadcast { delivered }
    }
}

/// Best-effort send to one peer; a closed peer is skipped, never an error
fn deliver(id: &str, handle: &PeerHandle, text: &str, stats: &RelayStats) -> bool {
    if handle.is_open() && handle.send(text).is_ok() {
        return true;
    }

    stats.stale_recipient();
    tracing::debug!(peer_id = %id, "Skipping closed recipient");
    false
}

fn deliver_except(view: &PeerView<'_>, exclude: Option<&str>, text: &str, stats: &RelayStats) -> usize {
    let mut delivered = 0;
    view.for_each_except(exclude, |id, handle| {
        if deliver(id.as_str(), handle, text, stats) {
            delivered += 1;
        }
    });
    delivered
}
