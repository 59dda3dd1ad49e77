//! Strict UTC timestamp validators.
//!
//! Only `YYYY-MM-DDTHH:MM:SSZ` is accepted: no fractional seconds, no
//! offsets other than the literal `Z`.

use chrono::{DateTime, NaiveDateTime, Utc};

pub const ISO_UTC_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parse a strict `YYYY-MM-DDTHH:MM:SSZ` timestamp.
pub fn parse_iso_utc(ts: &str) -> Option<DateTime<Utc>> {
    // chrono accepts single-digit fields; pin the exact width first.
    if ts.len() != 20 {
        return None;
    }
    NaiveDateTime::parse_from_str(ts, ISO_UTC_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Return `true` if `ts` matches `YYYY-MM-DDTHH:MM:SSZ`.
pub fn is_iso_utc(ts: &str) -> bool {
    parse_iso_utc(ts).is_some()
}

/// Return `true` if the timestamp is not after the current UTC time.
///
/// Unparseable timestamps are never "not future".
pub fn not_future(ts: &str) -> bool {
    parse_iso_utc(ts).is_some_and(|dt| dt <= Utc::now())
}
