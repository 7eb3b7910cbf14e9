//! Signaling server listener
//!
//! Handles the TCP accept loop and spawns connection handlers.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::error::Result;
use crate::router::SignalingRouter;
use crate::server::config::ServerConfig;
use crate::server::connection::Connection;

/// WebSocket signaling server
pub struct SignalServer {
    config: Arc<ServerConfig>,
    router: Arc<SignalingRouter>,
    connection_semaphore: Option<Arc<Semaphore>>,
}

impl SignalServer {
    /// Create a new server with a fresh registry and UUID ids
    pub fn new(config: ServerConfig) -> Self {
        Self::with_router(config, Arc::new(SignalingRouter::with_defaults()))
    }

    /// Create a new server around an existing router
    pub fn with_router(config: ServerConfig, router: Arc<SignalingRouter>) -> Self {
        let connection_semaphore = if config.max_connections > 0 {
            Some(Arc::new(Semaphore::new(config.max_connections)))
        } else {
            None
        };

        Self {
            config: Arc::new(config),
            router,
            connection_semaphore,
        }
    }

    /// Get a reference to the router
    pub fn router(&self) -> &Arc<SignalingRouter> {
        &self.router
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    /// Bind the configured address
    pub async fn bind(&self) -> Result<TcpListener> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        Ok(listener)
    }

    /// Run the server
    ///
    /// This method blocks until accepting fails irrecoverably.
    pub async fn run(&self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let listener = self.bind().await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            addr = %addr,
            path = %self.config.path,
            "Signaling server listening"
        );

        tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
            result = self.accept_loop(&listener) => result,
        }
    }

    async fn accept_loop(&self, listener: &TcpListener) -> Result<()> {
        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    fn handle_connection(&self, socket: TcpStream, peer_addr: SocketAddr) {
        // Check connection limit
        let permit = match self.connection_semaphore {
            Some(ref sem) => match sem.clone().try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    tracing::warn!(peer = %peer_addr, "Connection rejected: limit reached");
                    return;
                }
            },
            None => None,
        };

        tracing::debug!(peer = %peer_addr, "New connection");

        if self.config.tcp_nodelay {
            if let Err(e) = socket.set_nodelay(true) {
                tracing::error!(error = %e, "Failed to configure socket");
                return;
            }
        }

        let config = Arc::clone(&self.config);
        let router = Arc::clone(&self.router);

        tokio::spawn(async move {
            // Held for the lifetime of the connection
            let _permit = permit;

            let connection = Connection::new(socket, peer_addr, config, router);
            if let Err(e) = connection.run().await {
                tracing::debug!(peer = %peer_addr, error = %e, "Connection error");
            }

            tracing::debug!(peer = %peer_addr, "Connection closed");
        });
    }
}
