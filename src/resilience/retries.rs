//! Retry logic.
//!
//! # Responsibilities
//! - Determine if an outcome is retryable (status forcelist, transient
//!   transport failures)
//! - Pick the wait before the next attempt (Retry-After or backoff)
//! - Drive the attempt loop as an explicit state machine
//!
//! # Design Decisions
//! - The harness policy retries every standard method, POST/PUT/DELETE
//!   included. Only safe because the mock backend never mutates state; do
//!   not reuse this policy against a backend with side-effecting writes
//! - Connect failures are retried for any method (nothing reached the server)
//! - A `Retry-After` hint replaces the computed backoff but is capped at
//!   `max_backoff`, so no single wait exceeds it
//! - Exhaustion returns the last response unless `raise_on_status` is set

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use axum::http::{HeaderValue, Method, StatusCode};

use crate::config::RetryConfig;
use crate::resilience::backoff::{calculate_backoff, parse_retry_after};

/// Statuses on which a `Retry-After` header is honoured.
const RETRY_AFTER_STATUSES: [StatusCode; 3] = [
    StatusCode::PAYLOAD_TOO_LARGE,
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::SERVICE_UNAVAILABLE,
];

/// Transport-level failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailure {
    /// Connection could not be established (refused, DNS, unreachable).
    Connect,
    /// The per-request deadline expired.
    Timeout,
    /// The connection broke after the request was sent.
    Reset,
    /// Anything else (invalid request, redirect loop, ...). Never retried.
    Other,
}

impl TransportFailure {
    pub fn classify(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportFailure::Timeout
        } else if err.is_connect() {
            TransportFailure::Connect
        } else if err.is_request() || err.is_body() {
            TransportFailure::Reset
        } else {
            TransportFailure::Other
        }
    }

    pub fn is_transient(self) -> bool {
        !matches!(self, TransportFailure::Other)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransportFailure::Connect => "connect",
            TransportFailure::Timeout => "timeout",
            TransportFailure::Reset => "reset",
            TransportFailure::Other => "other",
        }
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a single attempt produced.
#[derive(Debug, Clone, Copy)]
pub enum Outcome<'a> {
    Response {
        status: StatusCode,
        retry_after: Option<&'a HeaderValue>,
    },
    Transport(TransportFailure),
}

/// Why a retry was scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    Status(StatusCode),
    Transport(TransportFailure),
}

impl RetryReason {
    /// Metric label for the reason.
    pub fn label(&self) -> String {
        match self {
            RetryReason::Status(status) => status.as_u16().to_string(),
            RetryReason::Transport(failure) => failure.as_str().to_string(),
        }
    }
}

/// Decision taken after an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait `delay`, then resend.
    Retry { delay: Duration, reason: RetryReason },
    /// The outcome is final (success, or not retryable).
    Stop,
    /// The outcome was retryable but the retry limit is reached.
    Exhausted,
}

/// Retry policy applied by the resilient client.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub max_backoff: Duration,
    pub jitter: f64,
    pub status_forcelist: HashSet<StatusCode>,
    pub allowed_methods: HashSet<Method>,
    pub respect_retry_after: bool,
    pub raise_on_status: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    /// Build a policy from configuration. Invalid codes/methods are skipped
    /// (validation reports them before this point).
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_base: secs_to_duration(config.backoff_base_secs),
            max_backoff: secs_to_duration(config.max_backoff_secs),
            jitter: config.jitter,
            status_forcelist: config
                .status_forcelist
                .iter()
                .filter_map(|&code| StatusCode::from_u16(code).ok())
                .collect(),
            allowed_methods: config
                .allowed_methods
                .iter()
                .filter_map(|m| Method::from_bytes(m.to_ascii_uppercase().as_bytes()).ok())
                .collect(),
            respect_retry_after: config.respect_retry_after,
            raise_on_status: config.raise_on_status,
        }
    }

    /// A policy that sends each request exactly once.
    pub fn no_retries() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn is_retryable_method(&self, method: &Method) -> bool {
        self.allowed_methods.contains(method)
    }

    /// Whether a response status asks for a retry.
    pub fn is_retryable_status(&self, status: StatusCode, has_retry_after: bool) -> bool {
        self.status_forcelist.contains(&status)
            || (self.respect_retry_after
                && has_retry_after
                && RETRY_AFTER_STATUSES.contains(&status))
    }

    /// Backoff before the `retry`-th retry (1-based).
    pub fn backoff_for(&self, retry: u32) -> Duration {
        calculate_backoff(retry, self.backoff_base, self.max_backoff, self.jitter)
    }

    /// Decide what to do after an attempt, given `retries_done` so far.
    pub fn decide(
        &self,
        method: &Method,
        retries_done: u32,
        outcome: &Outcome<'_>,
    ) -> RetryDecision {
        let reason = match *outcome {
            Outcome::Response { status, retry_after } => {
                if !self.is_retryable_method(method)
                    || !self.is_retryable_status(status, retry_after.is_some())
                {
                    return RetryDecision::Stop;
                }
                RetryReason::Status(status)
            }
            Outcome::Transport(failure) => {
                let retryable = match failure {
                    TransportFailure::Connect => true,
                    TransportFailure::Timeout | TransportFailure::Reset => {
                        self.is_retryable_method(method)
                    }
                    TransportFailure::Other => false,
                };
                if !retryable {
                    return RetryDecision::Stop;
                }
                RetryReason::Transport(failure)
            }
        };

        if retries_done >= self.max_retries {
            return RetryDecision::Exhausted;
        }

        let retry = retries_done + 1;
        let delay = match *outcome {
            Outcome::Response { status, retry_after: Some(value) }
                if self.respect_retry_after && RETRY_AFTER_STATUSES.contains(&status) =>
            {
                parse_retry_after(value)
                    .map(|hint| hint.min(self.max_backoff))
                    .unwrap_or_else(|| self.backoff_for(retry))
            }
            _ => self.backoff_for(retry),
        };

        RetryDecision::Retry { delay, reason }
    }
}

fn secs_to_duration(secs: f64) -> Duration {
    if secs.is_finite() && secs > 0.0 {
        Duration::from_micros((secs * 1_000_000.0).round() as u64)
    } else {
        Duration::ZERO
    }
}

/// Attempt loop states: `Attempting → Waiting → Attempting → … → Done`.
///
/// `T` is whatever an attempt produced; `Done` keeps the final one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryState<T> {
    /// Sending attempt number `retries_done + 1`.
    Attempting { retries_done: u32 },
    /// Sleeping `delay` before the next attempt.
    Waiting { retries_done: u32, delay: Duration },
    /// No further attempts. `exhausted` is set when the last outcome was
    /// retryable but the retry limit was reached.
    Done {
        retries_done: u32,
        exhausted: bool,
        last: T,
    },
}

impl<T> RetryState<T> {
    pub fn start() -> Self {
        RetryState::Attempting { retries_done: 0 }
    }

    /// Transition out of `Attempting` given the policy decision for `last`.
    pub fn on_decision(self, decision: &RetryDecision, last: T) -> Self {
        match (self, decision) {
            (RetryState::Attempting { retries_done }, RetryDecision::Retry { delay, .. }) => {
                RetryState::Waiting { retries_done, delay: *delay }
            }
            (RetryState::Attempting { retries_done }, decision) => RetryState::Done {
                retries_done,
                exhausted: *decision == RetryDecision::Exhausted,
                last,
            },
            (other, _) => other,
        }
    }

    /// Transition out of `Waiting` once the delay has elapsed.
    pub fn on_wake(self) -> Self {
        match self {
            RetryState::Waiting { retries_done, .. } => RetryState::Attempting {
                retries_done: retries_done + 1,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(code: u16) -> Outcome<'static> {
        Outcome::Response {
            status: StatusCode::from_u16(code).unwrap(),
            retry_after: None,
        }
    }

    #[test]
    fn test_default_policy_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.backoff_base, Duration::from_millis(300));
        for code in [429, 500, 502, 503, 504] {
            assert!(policy.status_forcelist.contains(&StatusCode::from_u16(code).unwrap()));
        }
        for method in [Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
            assert!(policy.is_retryable_method(&method));
        }
        assert!(policy.respect_retry_after);
        assert!(!policy.raise_on_status);
    }

    #[test]
    fn test_exponential_schedule() {
        let policy = RetryPolicy::default();
        let delays: Vec<_> = (0..3)
            .map(|done| match policy.decide(&Method::GET, done, &response(503)) {
                RetryDecision::Retry { delay, .. } => delay,
                other => panic!("expected retry, got {other:?}"),
            })
            .collect();
        assert_eq!(
            delays,
            [Duration::from_millis(300), Duration::from_millis(600), Duration::from_millis(1200)]
        );
        assert_eq!(policy.decide(&Method::GET, 3, &response(503)), RetryDecision::Exhausted);
    }

    #[test]
    fn test_non_retryable_statuses_stop() {
        let policy = RetryPolicy::default();
        for code in [200, 201, 400, 404, 501] {
            assert_eq!(policy.decide(&Method::GET, 0, &response(code)), RetryDecision::Stop);
        }
    }

    #[test]
    fn test_post_is_retried_by_harness_policy() {
        let policy = RetryPolicy::default();
        assert!(matches!(
            policy.decide(&Method::POST, 0, &response(502)),
            RetryDecision::Retry { .. }
        ));
    }

    #[test]
    fn test_disallowed_method_only_retries_connect_failures() {
        let mut policy = RetryPolicy::default();
        policy.allowed_methods.remove(&Method::POST);

        assert_eq!(policy.decide(&Method::POST, 0, &response(503)), RetryDecision::Stop);
        assert_eq!(
            policy.decide(&Method::POST, 0, &Outcome::Transport(TransportFailure::Timeout)),
            RetryDecision::Stop
        );
        assert!(matches!(
            policy.decide(&Method::POST, 0, &Outcome::Transport(TransportFailure::Connect)),
            RetryDecision::Retry { .. }
        ));
    }

    #[test]
    fn test_retry_after_takes_precedence() {
        let policy = RetryPolicy::default();
        let header = HeaderValue::from_static("2");
        let outcome = Outcome::Response {
            status: StatusCode::SERVICE_UNAVAILABLE,
            retry_after: Some(&header),
        };
        assert_eq!(
            policy.decide(&Method::GET, 0, &outcome),
            RetryDecision::Retry {
                delay: Duration::from_secs(2),
                reason: RetryReason::Status(StatusCode::SERVICE_UNAVAILABLE),
            }
        );

        // Unparseable hint falls back to backoff.
        let garbage = HeaderValue::from_static("later");
        let outcome = Outcome::Response {
            status: StatusCode::TOO_MANY_REQUESTS,
            retry_after: Some(&garbage),
        };
        assert!(matches!(
            policy.decide(&Method::GET, 1, &outcome),
            RetryDecision::Retry { delay, .. } if delay == Duration::from_millis(600)
        ));
    }

    #[test]
    fn test_retry_after_capped_at_max_backoff() {
        let policy = RetryPolicy::default();
        let header = HeaderValue::from_static("100000");
        let outcome = Outcome::Response {
            status: StatusCode::TOO_MANY_REQUESTS,
            retry_after: Some(&header),
        };
        assert!(matches!(
            policy.decide(&Method::GET, 0, &outcome),
            RetryDecision::Retry { delay, .. } if delay == Duration::from_secs(120)
        ));
    }

    #[test]
    fn test_retry_after_ignored_when_disabled_or_status_not_eligible() {
        let mut policy = RetryPolicy::default();
        let header = HeaderValue::from_static("9");

        // 500 is in the forcelist but is not a Retry-After status.
        let outcome = Outcome::Response {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            retry_after: Some(&header),
        };
        assert!(matches!(
            policy.decide(&Method::GET, 0, &outcome),
            RetryDecision::Retry { delay, .. } if delay == Duration::from_millis(300)
        ));

        policy.respect_retry_after = false;
        let outcome = Outcome::Response {
            status: StatusCode::SERVICE_UNAVAILABLE,
            retry_after: Some(&header),
        };
        assert!(matches!(
            policy.decide(&Method::GET, 0, &outcome),
            RetryDecision::Retry { delay, .. } if delay == Duration::from_millis(300)
        ));
    }

    #[test]
    fn test_retry_after_makes_413_retryable() {
        let policy = RetryPolicy::default();
        let header = HeaderValue::from_static("1");
        let outcome = Outcome::Response {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            retry_after: Some(&header),
        };
        assert!(matches!(policy.decide(&Method::GET, 0, &outcome), RetryDecision::Retry { .. }));
        assert_eq!(policy.decide(&Method::GET, 0, &response(413)), RetryDecision::Stop);
    }

    #[test]
    fn test_other_transport_failures_stop() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.decide(&Method::GET, 0, &Outcome::Transport(TransportFailure::Other)),
            RetryDecision::Stop
        );
    }

    #[test]
    fn test_state_machine_walk() {
        let policy = RetryPolicy::default();
        let mut state = RetryState::start();
        let mut visited = vec![state.clone()];

        for code in [503, 503, 200] {
            let RetryState::Attempting { retries_done } = state else {
                panic!("expected Attempting, got {state:?}");
            };
            let decision = policy.decide(&Method::GET, retries_done, &response(code));
            state = state.on_decision(&decision, code);
            visited.push(state.clone());
            if let RetryState::Waiting { .. } = state {
                state = state.on_wake();
                visited.push(state.clone());
            }
        }

        assert_eq!(
            visited,
            vec![
                RetryState::Attempting { retries_done: 0 },
                RetryState::Waiting { retries_done: 0, delay: Duration::from_millis(300) },
                RetryState::Attempting { retries_done: 1 },
                RetryState::Waiting { retries_done: 1, delay: Duration::from_millis(600) },
                RetryState::Attempting { retries_done: 2 },
                RetryState::Done { retries_done: 2, exhausted: false, last: 200 },
            ]
        );
    }

    #[test]
    fn test_state_machine_marks_exhaustion() {
        let policy = RetryPolicy::default().with_max_retries(0);
        let state = RetryState::start();
        let decision = policy.decide(&Method::GET, 0, &response(503));
        assert_eq!(
            state.on_decision(&decision, 503),
            RetryState::Done { retries_done: 0, exhausted: true, last: 503 }
        );
    }

    #[test]
    fn test_from_config_skips_invalid_entries() {
        let config = RetryConfig {
            status_forcelist: vec![503, 42],
            allowed_methods: vec!["get".into(), "BAD METHOD".into()],
            ..RetryConfig::default()
        };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.status_forcelist.len(), 1);
        assert_eq!(policy.allowed_methods.len(), 1);
        assert!(policy.is_retryable_method(&Method::GET));
    }
}
