//! Server configuration

use std::net::{Ipv4Addr, SocketAddr};

use crate::protocol::constants::{DEFAULT_PATH, DEFAULT_PORT};

/// Environment variable overriding the listening port
pub const PORT_ENV: &str = "PORT";

/// Default inbound message limit (16 MiB)
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 16 << 20;

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Request path accepted for the WebSocket upgrade
    pub path: String,

    /// Maximum concurrent connections (0 = unlimited)
    pub max_connections: usize,

    /// Largest inbound message accepted, in bytes (None = transport default)
    pub max_message_size: Option<usize>,

    /// Enable TCP_NODELAY (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            path: DEFAULT_PATH.to_string(),
            max_connections: 0, // Unlimited
            // Same as tungstenite's frame limit
            max_message_size: Some(DEFAULT_MAX_MESSAGE_SIZE),
            tcp_nodelay: true,
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Default config with the port taken from `PORT` when set
    ///
    /// Unparsable values are ignored with a warning.
    pub fn from_env() -> Self {
        let config = Self::default();

        match std::env::var(PORT_ENV) {
            Ok(value) => config.apply_port(&value),
            Err(_) => config,
        }
    }

    fn apply_port(mut self, value: &str) -> Self {
        match value.trim().parse::<u16>() {
            Ok(port) => self.bind_addr.set_port(port),
            Err(e) => {
                tracing::warn!(value = %value, error = %e, "Ignoring invalid {}", PORT_ENV);
            }
        }
        self
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the upgrade path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set maximum connections
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set maximum inbound message size
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = Some(size);
        self
    }

    /// Check whether a request path matches the configured one
    ///
    /// The query string is ignored.
    pub fn accepts_path(&self, request_path: &str) -> bool {
        let path = request_path.split('?').next().unwrap_or_default();
        path == self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.path, "/ws");
        assert_eq!(config.max_connections, 0);
        assert_eq!(config.max_message_size, Some(DEFAULT_MAX_MESSAGE_SIZE));
        assert!(config.max_message_size.unwrap() > 1024 * 1024);
        assert!(config.tcp_nodelay);
    }

    #[test]
    fn test_with_addr() {
        let addr: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        let config = ServerConfig::with_addr(addr);

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.path, "/ws");
    }

    #[test]
    fn test_apply_port() {
        let config = ServerConfig::default().apply_port("3000");
        assert_eq!(config.bind_addr.port(), 3000);

        let config = ServerConfig::default().apply_port(" 3001\n");
        assert_eq!(config.bind_addr.port(), 3001);
    }

    #[test]
    fn test_apply_port_invalid_ignored() {
        let config = ServerConfig::default().apply_port("not-a-port");
        assert_eq!(config.bind_addr.port(), 8080);

        let config = ServerConfig::default().apply_port("70000");
        assert_eq!(config.bind_addr.port(), 8080);
    }

    #[test]
    fn test_accepts_path() {
        let config = ServerConfig::default();

        assert!(config.accepts_path("/ws"));
        assert!(config.accepts_path("/ws?room=1"));
        assert!(!config.accepts_path("/"));
        assert!(!config.accepts_path("/ws/extra"));
    }

    #[test]
    fn test_builder_chaining() {
        let addr: SocketAddr = "127.0.0.1:8081".parse().unwrap();
        let config = ServerConfig::default()
            .bind(addr)
            .path("/signal")
            .max_connections(50)
            .max_message_size(1024);

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.path, "/signal");
        assert_eq!(config.max_connections, 50);
        assert_eq!(config.max_message_size, Some(1024));
        assert!(config.accepts_path("/signal"));
    }
}
