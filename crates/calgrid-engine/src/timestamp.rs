//! Parsing of stored and user-supplied timestamps.
//!
//! The engine works in naive local time. Older saved calendars carry
//! `Date.toJSON()` strings such as `2024-01-01T09:00:00.000Z`; for those, and
//! any other RFC 3339 value with an offset, the wall time as written is kept
//! and the offset dropped. Values are always written back without an offset.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::de::{Deserializer, Error as _};
use serde::Deserialize;

use crate::error::{EngineError, Result};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an RFC 3339 timestamp, a naive local date-time (seconds optional,
/// `T` or space separated) or a bare date at midnight.
pub fn parse(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
        .ok_or_else(|| EngineError::InvalidTimestamp(s.to_string()))
}

/// `deserialize_with` helper for required timestamps.
pub(crate) fn deserialize<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(D::Error::custom)
}

/// `deserialize_with` helper for optional timestamps; `null` reads as `None`.
pub(crate) fn deserialize_option<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| parse(&raw).map_err(D::Error::custom))
        .transpose()
}
