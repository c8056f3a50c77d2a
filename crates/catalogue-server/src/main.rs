//! Catalogue Server Binary
//!
//! Configuration comes from `CATALOGUE_CONFIG`, `CATALOGUE_ADDR` and
//! `CATALOGUE_DB`; log filtering from `RUST_LOG`.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use catalogue_server::config::ServerConfig;
use catalogue_server::{serve, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::load()?;
    let state = Arc::new(AppState::open(&config)?);

    serve(&config.addr, state).await
}
