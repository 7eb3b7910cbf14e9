//! Simple signaling relay
//!
//! Run with: cargo run --example simple_server [BIND_ADDR]
//!
//! Examples:
//!   cargo run --example simple_server                    # binds to 0.0.0.0:8080 (or $PORT)
//!   cargo run --example simple_server 127.0.0.1:9000     # binds to 127.0.0.1:9000
//!   RUST_LOG=signal_relay=debug cargo run --example simple_server
//!
//! Clients connect to ws://localhost:8080/ws and receive a welcome:
//!   {"type":"welcome","peerId":"…","peers":["…"]}
//!
//! From then on:
//!   {"to":"<peerId>","from":"<me>","type":"offer","data":{…}}   unicast
//!   {"type":"broadcast","from":"<me>","data":{…}}               everyone but <me>
//!   {"data":"peers-request"}                                  current peer list

use std::net::SocketAddr;
use std::time::Duration;

use signal_relay::{ServerConfig, SignalServer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = ServerConfig::from_env();
    if let Some(arg) = std::env::args().nth(1) {
        let addr: SocketAddr = arg.parse()?;
        config = config.bind(addr);
    }

    let path = config.path.clone();
    let server = SignalServer::new(config);

    println!("WebSocket signaling relay at ws://{}{}", server.bind_addr(), path);

    let stats = std::sync::Arc::clone(server.router().stats());
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(30));
        loop {
            ticker.tick().await;
            let snapshot = stats.snapshot();
            println!(
                "Stats: uptime={}s peers={} frames={} unicast={} broadcast={} dropped={}",
                snapshot.uptime.as_secs(),
                snapshot.active_connections,
                snapshot.frames_received,
                snapshot.unicast_delivered,
                snapshot.broadcasts,
                snapshot.malformed_frames + snapshot.unroutable_frames,
            );
        }
    });

    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
