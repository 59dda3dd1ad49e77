//! Exponential backoff and `Retry-After` parsing.

use std::time::Duration;

use axum::http::HeaderValue;
use chrono::{DateTime, Utc};
use rand::Rng;

/// Calculate exponential backoff for the `attempt`-th retry (1-based).
///
/// Retry `n` waits `base * 2^(n-1)`, capped at `max`. `jitter` adds up to
/// that fraction (at most 1.0) of the capped delay at random; `0.0` keeps
/// it exact.
pub fn calculate_backoff(attempt: u32, base: Duration, max: Duration, jitter: f64) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let capped_delay = 2u32
        .checked_pow(attempt - 1)
        .and_then(|factor| base.checked_mul(factor))
        .unwrap_or(max)
        .min(max);

    if jitter.is_nan() || jitter <= 0.0 {
        return capped_delay;
    }

    let extra = rand::thread_rng().gen_range(0.0..=jitter.min(1.0));
    capped_delay.saturating_add(capped_delay.mul_f64(extra))
}

/// Parse a `Retry-After` value: delta-seconds or an HTTP-date.
pub fn parse_retry_after(value: &HeaderValue) -> Option<Duration> {
    parse_retry_after_at(value, Utc::now())
}

/// Parse a `Retry-After` value relative to `now`.
///
/// Dates in the past yield a zero delay.
pub fn parse_retry_after_at(value: &HeaderValue, now: DateTime<Utc>) -> Option<Duration> {
    let raw = value.to_str().ok()?.trim();

    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw.parse::<u64>().ok().map(Duration::from_secs);
    }

    let at = DateTime::parse_from_rfc2822(raw).ok()?.with_timezone(&Utc);
    Some((at - now).to_std().unwrap_or(Duration::ZERO))
}
