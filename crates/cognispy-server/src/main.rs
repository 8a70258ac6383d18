//! CogniSpy game server.

use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod advisory;
mod config;
mod protocol;
mod server;
mod view;

use config::ServerConfig;
use server::ServerState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    info!(
        advisory = config.advisory_url.is_some(),
        timeout_ms = config.advisory_timeout.as_millis() as u64,
        seeded = config.seed.is_some(),
        "Starting CogniSpy server..."
    );

    let addr = config.addr;
    let state = Arc::new(ServerState::new(config));

    server::run_server(addr, state).await
}
