//! Mock API server (v1)
//!
//! Serves a LeetCode-like backend from a fixed seed dataset so API test
//! suites get deterministic responses.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │                 MOCK SERVER                  │
//!   Client Request      │  ┌──────────┐   ┌──────────┐   ┌──────────┐  │
//!   ────────────────────┼─▶│ request  │──▶│  router  │──▶│ handlers │  │
//!                       │  │ id/trace │   │          │   │          │  │
//!                       │  └──────────┘   └──────────┘   └────┬─────┘  │
//!                       │                                     │        │
//!   Client Response     │                ┌──────────┐   ┌────▼─────┐  │
//!   ◀───────────────────┼────────────────│ response │◀──│   seed   │  │
//!                       │                │  errors  │   │ (Arc, ro)│  │
//!                       │                └──────────┘   └──────────┘  │
//!                       └──────────────────────────────────────────────┘
//! ```
//!
//! Usage: `mock-server [config.toml]`. `BIND_ADDRESS` and `SEED_PATH`
//! override the file.

use std::path::PathBuf;

use mock_api_harness::config::load_from_env;
use mock_api_harness::lifecycle::{startup, wait_for_signal, Shutdown};
use mock_api_harness::observability::logging::init_logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = load_from_env(config_path.as_deref())?;

    init_logging(&config.observability.log_level);
    tracing::info!("mock-server v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.server.bind_address,
        seed_path = ?config.server.seed_path,
        request_timeout_secs = config.server.request_timeout_secs,
        "Configuration loaded"
    );

    let (server, listener) = startup::prepare(config).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
