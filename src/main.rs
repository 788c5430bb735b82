//! Pairgate binary: wire the service together and serve until ctrl-c.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use pairgate::config::Config;
use pairgate::pairing::PairingService;
use pairgate::protocol::SimulatedConnector;
use pairgate::server::{PairingServer, ServerConfig, routes};
use pairgate::store::SessionStore;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pairgate=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    let store = SessionStore::new(&config.sessions_root)?;
    tracing::info!(root = %store.root().display(), "session store ready");

    let connector = Arc::new(SimulatedConnector::default());
    let service = Arc::new(PairingService::new(store, connector, config.archive_delay));

    let mut server = PairingServer::new(ServerConfig {
        addr: SocketAddr::from(([0, 0, 0, 0], config.port)),
    });
    server.start(routes(service)).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    server.shutdown().await;
    Ok(())
}
