//! Timestamp helpers for the wire format.
//!
//! The service speaks ISO-8601 UTC at second precision with a literal `Z`
//! suffix (never `+00:00`).

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::PolybridgeError;

/// Format a timestamp the way the service expects: second precision, `Z` suffix.
pub fn to_iso(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Parse a caller-supplied timestamp, or fall back when none was given.
///
/// Accepts RFC 3339 strings (with `Z` or a numeric offset) and naive
/// `YYYY-MM-DDTHH:MM:SS` strings, which are interpreted as UTC.
pub fn ensure_datetime(
    value: Option<&str>,
    fallback: DateTime<Utc>,
) -> Result<DateTime<Utc>, PolybridgeError> {
    match value {
        None => Ok(fallback),
        Some(raw) => parse_timestamp(raw)
            .ok_or_else(|| PolybridgeError::Validation(format!("invalid timestamp '{raw}'"))),
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>().ok().map(|naive| naive.and_utc())
}
