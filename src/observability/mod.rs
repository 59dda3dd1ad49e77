//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Server and client produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!     → tracing.rs (per-request spans with request IDs)
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Request ID flows from the client session into server spans
//! - Metrics are cheap and optional

pub mod logging;
pub mod metrics;
pub mod tracing;
