//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the harness.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the mock service and the test client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HarnessConfig {
    /// Mock service settings (bind address, seed file).
    pub server: ServerConfig,

    /// Client session settings (base URL, default timeout).
    pub client: ClientConfig,

    /// Retry policy for the resilient client.
    pub retries: RetryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Mock service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8000").
    pub bind_address: String,

    /// Seed dataset file. The embedded dataset is served when unset.
    pub seed_path: Option<PathBuf>,

    /// Request timeout enforced by the server middleware, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
            seed_path: None,
            request_timeout_secs: 30,
        }
    }
}

/// Client session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API base URL. A trailing slash is stripped at client construction.
    pub base_url: String,

    /// Default per-request timeout in seconds.
    pub default_timeout_secs: f64,
}

impl ClientConfig {
    /// The default timeout as a `Duration`; falls back to 10s for values
    /// validation would reject (negative, NaN, infinite).
    pub fn default_timeout(&self) -> Duration {
        match Duration::try_from_secs_f64(self.default_timeout_secs) {
            Ok(timeout) if !timeout.is_zero() => timeout,
            _ => Duration::from_secs(10),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            default_timeout_secs: 10.0,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,

    /// Backoff factor in seconds; retry `n` waits `base * 2^(n-1)`.
    pub backoff_base_secs: f64,

    /// Upper bound for a single computed backoff, in seconds.
    pub max_backoff_secs: f64,

    /// Random extra delay as a fraction of the computed backoff (0.0 = none).
    pub jitter: f64,

    /// Response status codes that trigger a retry.
    pub status_forcelist: Vec<u16>,

    /// Methods the policy applies to.
    pub allowed_methods: Vec<String>,

    /// Let a `Retry-After` header override the computed backoff.
    pub respect_retry_after: bool,

    /// Fail with an error instead of returning the last response once
    /// retries are exhausted.
    pub raise_on_status: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_secs: 0.3,
            max_backoff_secs: 120.0,
            jitter: 0.0,
            status_forcelist: vec![429, 500, 502, 503, 504],
            allowed_methods: ["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS", "HEAD"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
            respect_retry_after: true,
            raise_on_status: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
