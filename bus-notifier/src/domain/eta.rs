//! ETA timestamp handling.
//!
//! Curlbus reports ETAs as ISO 8601 datetimes with a UTC offset
//! (`2020-06-17T04:50:00+03:00`). Minutes remaining are computed against
//! the caller's notion of "now", so aggregation stays a pure function.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};

/// Error returned when an ETA string is not a recognizable datetime.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid ETA: {0:?}")]
pub struct InvalidEta(pub String);

/// Offset-aware formats tried after RFC 3339.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Formats without an offset; interpreted in the offset of `now`.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an upstream ETA.
///
/// Datetimes without an offset are taken to be in the same offset as `now`.
pub fn parse_eta(s: &str, now: &DateTime<FixedOffset>) -> Result<DateTime<FixedOffset>, InvalidEta> {
    let trimmed = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt);
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, fmt) {
            return Ok(dt);
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt)
            && let Some(dt) = now.offset().from_local_datetime(&naive).single()
        {
            return Ok(dt);
        }
    }

    Err(InvalidEta(s.to_string()))
}

/// Whole minutes from `now` until `eta`, truncated.
///
/// A bus that is due or has just left yields 0, never a negative value.
pub fn minutes_until(eta: &DateTime<FixedOffset>, now: &DateTime<FixedOffset>) -> u32 {
    let minutes = eta.signed_duration_since(*now).num_minutes();
    if minutes <= 0 {
        return 0;
    }
    u32::try_from(minutes).unwrap_or(u32::MAX)
}
