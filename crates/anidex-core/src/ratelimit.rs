//! Per-IP submission caps computed from the persisted records.
//!
//! There is no in-memory counter: every check scans the stored document, so
//! limits survive restarts and are shared by every process that writes the
//! same file. Record volume is small enough that the linear scan is fine.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::config::LimitsConfig;
use crate::records::RecordMeta;

const HOUR_SECS: i64 = 3600;
const DAY_SECS: i64 = 86_400;

/// The hourly window.
pub fn hour() -> Duration {
    Duration::seconds(HOUR_SECS)
}

/// The daily window.
pub fn day() -> Duration {
    Duration::seconds(DAY_SECS)
}

/// Which cap a submission ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitExceeded {
    Hourly,
    Daily,
}

/// Count records from `ip` whose timestamp lies within `window` before `now`
/// (boundary inclusive). Records without a parsable timestamp are skipped.
pub fn count_recent(records: &[Value], ip: &str, window: Duration, now: DateTime<Utc>) -> usize {
    records
        .iter()
        .map(RecordMeta::from_value)
        .filter(|meta| meta.ip == Some(ip))
        .filter_map(|meta| meta.timestamp)
        .filter(|ts| now - *ts <= window)
        .count()
}

/// Independent hourly and daily caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimits {
    pub per_hour: usize,
    pub per_day: usize,
}

impl Default for RateLimits {
    fn default() -> Self {
        LimitsConfig::default().into()
    }
}

impl From<LimitsConfig> for RateLimits {
    fn from(c: LimitsConfig) -> Self {
        Self {
            per_hour: c.per_hour,
            per_day: c.per_day,
        }
    }
}

impl RateLimits {
    /// Check the hourly cap, then the daily cap.
    pub fn check(&self, records: &[Value], ip: &str, now: DateTime<Utc>) -> Result<(), LimitExceeded> {
        if count_recent(records, ip, hour(), now) >= self.per_hour {
            return Err(LimitExceeded::Hourly);
        }
        if count_recent(records, ip, day(), now) >= self.per_day {
            return Err(LimitExceeded::Daily);
        }
        Ok(())
    }
}
