//! Metrics collection and exposition.
//!
//! # Metrics
//! - `mock_requests_total` (counter): served requests by endpoint, status
//! - `mock_request_duration_seconds` (histogram): time spent inside the router
//! - `client_retries_total` (counter): client retries by reason
//! - `client_responses_total` (counter): final client responses by method, status
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - The Prometheus endpoint is opt-in (`observability.metrics_enabled`)

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::resilience::RetryReason;

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(endpoint: &str, status: u16, elapsed: Duration) {
    metrics::counter!(
        "mock_requests_total",
        "endpoint" => endpoint.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("mock_request_duration_seconds", "endpoint" => endpoint.to_string())
        .record(elapsed.as_secs_f64());
}

pub fn record_retry(reason: &RetryReason) {
    metrics::counter!("client_retries_total", "reason" => reason.label()).increment(1);
}

pub fn record_client_response(method: &str, status: u16, retries: u32) {
    metrics::counter!(
        "client_responses_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "retried" => (retries > 0).to_string()
    )
    .increment(1);
}
