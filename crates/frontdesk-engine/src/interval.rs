//! Half-open time intervals within a single day.
//!
//! `[start, end)` includes `start` and excludes `end`, so back-to-back
//! appointments (one ending at 10:00, the next starting at 10:00) never
//! overlap.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// A half-open `[start, end)` range of wall-clock time on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl TimeInterval {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Length in whole minutes; zero (never negative) when `end <= start`.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes().max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Two intervals overlap iff `a.start < b.end && b.start < a.end`.
    ///
    /// Symmetric, and false for touching intervals.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Minutes shared by both intervals (0 when they do not overlap).
    pub fn overlap_minutes(&self, other: &TimeInterval) -> i64 {
        if !self.overlaps(other) {
            return 0;
        }
        (self.end.min(other.end) - self.start.max(other.start)).num_minutes()
    }

    /// Restrict this interval to `window`, or `None` if nothing remains.
    pub fn clip_to(&self, window: &TimeInterval) -> Option<TimeInterval> {
        let start = self.start.max(window.start);
        let end = self.end.min(window.end);
        (start < end).then_some(TimeInterval { start, end })
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

/// Free function form of [`TimeInterval::overlaps`].
pub fn overlaps(a: &TimeInterval, b: &TimeInterval) -> bool {
    a.overlaps(b)
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| EngineError::InvalidDate(format!("'{}': {}", s, e)))
}

/// Parse an `HH:MM` time. `HH:MM:SS` is accepted as well, since stored rows
/// sometimes carry seconds.
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|e| EngineError::InvalidTime(format!("'{}': {}", s, e)))
}

/// Serde adapter writing times as `HH:MM` and reading `HH:MM` or `HH:MM:SS`.
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time(&raw).map_err(de::Error::custom)
    }
}
