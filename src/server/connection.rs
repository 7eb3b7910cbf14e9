//! Per-connection task
//!
//! Upgrades the TCP stream to a WebSocket, registers the peer, then runs two
//! halves until the client goes away:
//!
//! - a writer task draining the peer's outbound channel into the socket
//! - the reader loop, handing each inbound frame to the router in order
//!
//! The peer is unregistered exactly once, after the reader loop ends.

use std::net::SocketAddr;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::Message;

use crate::error::Result;
use crate::registry::PeerHandle;
use crate::router::SignalingRouter;
use crate::server::config::ServerConfig;
use crate::session::SessionContext;

/// One accepted client connection
pub struct Connection {
    ctx: SessionContext,
    socket: TcpStream,
    config: Arc<ServerConfig>,
    router: Arc<SignalingRouter>,
}

impl Connection {
    /// Create a connection handler for an accepted socket
    pub fn new(
        socket: TcpStream,
        peer_addr: SocketAddr,
        config: Arc<ServerConfig>,
        router: Arc<SignalingRouter>,
    ) -> Self {
        Self {
            ctx: SessionContext::new(peer_addr),
            socket,
            config,
            router,
        }
    }

    /// Run the connection to completion
    pub async fn run(mut self) -> Result<()> {
        let mut ws_config = WebSocketConfig::default();
        ws_config.max_message_size = self.config.max_message_size;

        let config = Arc::clone(&self.config);
        let check_path = move |request: &Request, response: Response| {
            if config.accepts_path(request.uri().path()) {
                Ok(response)
            } else {
                let mut rejection = ErrorResponse::new(Some("Not Found".to_string()));
                *rejection.status_mut() = StatusCode::NOT_FOUND;
                Err(rejection)
            }
        };

        let ws = tokio_tungstenite::accept_hdr_async_with_config(
            self.socket,
            check_path,
            Some(ws_config),
        )
        .await?;
        let (mut sink, mut stream) = ws.split();

        let (handle, mut outbound) = PeerHandle::channel();
        let peer_id = self.router.connect(handle).await?;
        self.ctx.registered(peer_id.clone());

        tracing::debug!(
            peer_id = %peer_id,
            peer = %self.ctx.peer_addr,
            "WebSocket established"
        );

        // Ends once the registry drops the handle or the socket rejects a write
        let writer_id = peer_id.clone();
        let writer = tokio::spawn(async move {
            while let Some(text) = outbound.recv().await {
                if let Err(e) = sink.send(Message::Text(text)).await {
                    tracing::debug!(peer_id = %writer_id, error = %e, "Write failed");
                    break;
                }
            }
            let _ = sink.close().await;
        });

        while let Some(frame) = stream.next().await {
            let text = match frame {
                Ok(Message::Text(text)) => text,
                Ok(Message::Binary(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
                Ok(Message::Close(_)) => break,
                // Ping/pong is answered by tungstenite
                Ok(_) => continue,
                Err(e) => {
                    // The stream is unusable after an error; fall through to the close path
                    self.router.on_error(peer_id.as_str(), &e);
                    break;
                }
            };

            self.ctx.frames_received += 1;
            let outcome = self.router.handle_message(peer_id.as_str(), &text).await;
            tracing::trace!(
                peer_id = %peer_id,
                outcome = ?outcome,
                delivered = outcome.is_delivered(),
                "Frame dispatched"
            );
        }

        self.router.disconnect(peer_id.as_str()).await;
        if let Err(e) = writer.await {
            tracing::debug!(peer_id = %peer_id, error = %e, "Writer task failed");
        }

        tracing::debug!(
            peer_id = %self.ctx.peer_id_str(),
            peer = %self.ctx.peer_addr,
            frames = self.ctx.frames_received,
            duration_ms = self.ctx.duration().as_millis() as u64,
            "WebSocket closed"
        );

        Ok(())
    }
}
