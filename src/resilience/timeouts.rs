//! Timeout enforcement.
//!
//! # Responsibilities
//! - Resolve the deadline for a single client call
//! - Keep every call bounded: there is no "no timeout" setting
//!
//! # Design Decisions
//! - A per-call override replaces the session default for that call only
//! - Timeout expiry surfaces as a transport failure and is retried like one

use std::time::Duration;

/// Deadline for one call: the override if given, else the session default.
pub fn effective_timeout(default: Duration, per_call: Option<Duration>) -> Duration {
    per_call.unwrap_or(default)
}
