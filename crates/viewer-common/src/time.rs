//! End-time markers and lookback windows.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// End-time value meaning "always use the most recent data".
pub const REALTIME_SENTINEL: &str = "now";

/// Wire format for absolute end times (`YYYY-MM-DD_hh:mm:ss`, UTC).
pub const END_TIME_FORMAT: &str = "%Y-%m-%d_%H:%M:%S";

/// The `et` query parameter: realtime, or a fixed archive timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EndTime {
    /// Follow the newest data and refresh periodically
    #[default]
    Now,
    /// Archive mode, pinned to a UTC timestamp
    At(DateTime<Utc>),
}

impl EndTime {
    pub fn parse(s: &str) -> Result<Self, TimeParseError> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(REALTIME_SENTINEL) {
            return Ok(EndTime::Now);
        }
        NaiveDateTime::parse_from_str(s, END_TIME_FORMAT)
            .map(|ndt| EndTime::At(ndt.and_utc()))
            .map_err(|_| TimeParseError::InvalidFormat(s.to_string()))
    }

    pub fn is_realtime(&self) -> bool {
        matches!(self, EndTime::Now)
    }

    /// Resolve to a concrete reference time, using `now` for realtime.
    pub fn reference_time(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            EndTime::Now => now,
            EndTime::At(t) => *t,
        }
    }

    /// The eligibility window `[reference - lookback, reference]`.
    pub fn window(&self, lookback_secs: u32, now: DateTime<Utc>) -> TimeRange {
        let end = self.reference_time(now);
        TimeRange::new(end - Duration::seconds(i64::from(lookback_secs)), end)
    }
}

impl fmt::Display for EndTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndTime::Now => f.write_str(REALTIME_SENTINEL),
            EndTime::At(t) => write!(f, "{}", t.format(END_TIME_FORMAT)),
        }
    }
}

impl FromStr for EndTime {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EndTime::parse(s)
    }
}

impl TryFrom<String> for EndTime {
    type Error = TimeParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        EndTime::parse(&s)
    }
}

impl From<EndTime> for String {
    fn from(et: EndTime) -> Self {
        et.to_string()
    }
}

/// A closed time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, dt: &DateTime<Utc>) -> bool {
        dt >= &self.start && dt <= &self.end
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TimeParseError {
    #[error("Invalid end time '{0}', expected 'now' or YYYY-MM-DD_hh:mm:ss")]
    InvalidFormat(String),
}
