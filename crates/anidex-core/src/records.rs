//! Persisted intake records and their timestamp format.
//!
//! Records are stored as JSON arrays of flat objects. Timestamps are UTC
//! with six fractional digits and a literal `Z`, e.g.
//! `2025-03-01T12:30:05.123456Z`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// A "please add this title" submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub title: String,
    pub ip: String,
    pub timestamp: String,
}

/// A free-text feedback submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub feedback: String,
    pub ip: String,
    pub timestamp: String,
}

/// The two fields the rate limiter cares about, read leniently from any
/// stored element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMeta<'a> {
    pub ip: Option<&'a str>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl<'a> RecordMeta<'a> {
    pub fn from_value(value: &'a Value) -> Self {
        Self {
            ip: value.get("ip").and_then(Value::as_str),
            timestamp: value
                .get("timestamp")
                .and_then(Value::as_str)
                .and_then(parse_timestamp),
        }
    }
}

/// Render a timestamp in the stored format.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp. The fractional part and the trailing `Z` are
/// both optional.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('Z').unwrap_or(trimmed);
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
