//! Deterministic mock API and resilient test client.

pub mod client;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod seed;

pub use client::{ApiResponse, ClientError, RequestOptions, ResilientClient};
pub use config::HarnessConfig;
pub use http::MockServer;
pub use lifecycle::Shutdown;
pub use seed::SeedDataset;
