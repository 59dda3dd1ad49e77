//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the seed dataset exactly once
//! - Start the optional metrics endpoint
//! - Bind the listener last, so traffic only arrives when ready
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::HarnessConfig;
use crate::http::MockServer;
use crate::seed::{SeedDataset, SeedError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load seed data: {0}")]
    Seed(#[from] SeedError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Load the dataset named by the configuration, or the embedded one.
pub fn load_seed(config: &HarnessConfig) -> Result<SeedDataset, SeedError> {
    match &config.server.seed_path {
        Some(path) => SeedDataset::load(path),
        None => {
            let dataset = SeedDataset::embedded()?;
            tracing::info!(users = dataset.users.len(), "Using embedded seed dataset");
            Ok(dataset)
        }
    }
}

/// Build the server and bind its listener.
pub async fn prepare(config: HarnessConfig) -> Result<(MockServer, TcpListener), StartupError> {
    let seed = Arc::new(load_seed(&config)?);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = crate::observability::metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let address = config.server.bind_address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    Ok((MockServer::new(config, seed), listener))
}
