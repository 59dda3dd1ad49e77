//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Client call:
//!     → timeouts.rs (resolve per-call deadline)
//!     → send attempt
//!     → retries.rs (classify outcome, decide retry / stop / exhausted)
//!     → backoff.rs (exponential delay, or Retry-After when present)
//!     → next attempt or final response
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every call has a deadline
//! - The retry loop is an explicit state machine (Attempting/Waiting/Done)
//! - Backoff is deterministic by default so timing can be asserted in tests

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::{Outcome, RetryDecision, RetryPolicy, RetryReason, RetryState, TransportFailure};
