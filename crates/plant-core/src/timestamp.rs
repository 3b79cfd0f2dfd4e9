//! Wall-clock timestamps in the `YYYY-MM-DD HH:MM:SS` format
//!
//! The real-time clock collaborator hands out timestamps in this exact layout
//! and the timestamp log stores them verbatim, one per line.

use core::fmt::{self, Write};
use core::str::FromStr;

use chrono::format::ParseError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror_no_std::Error;

/// Length of a formatted timestamp
pub const TIMESTAMP_LEN: usize = 19;

const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampError {
    #[error("Timestamp must be 19 characters, got {0}")]
    Length(usize),
    #[error("Invalid timestamp: {0}")]
    Invalid(ParseError),
    #[error("Timestamp is not zero-padded YYYY-MM-DD HH:MM:SS")]
    Layout,
    #[error("Timestamp {0} out of range")]
    OutOfRange(&'static str),
}

/// Validated `YYYY-MM-DD HH:MM:SS` timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp(heapless::String<TIMESTAMP_LEN>);

impl Timestamp {
    /// Parse and validate a timestamp string
    pub fn parse(s: &str) -> Result<Self, TimestampError> {
        if s.len() != TIMESTAMP_LEN {
            return Err(TimestampError::Length(s.len()));
        }
        let datetime = NaiveDateTime::parse_from_str(s, FORMAT).map_err(TimestampError::Invalid)?;
        let ts = Self::from_datetime(&datetime)?;
        // Signed or unpadded fields parse but do not round-trip
        if ts.as_str() != s {
            return Err(TimestampError::Layout);
        }
        Ok(ts)
    }

    /// Build a timestamp from calendar fields
    pub fn from_parts(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, TimestampError> {
        let date = NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
            .ok_or(TimestampError::OutOfRange("date"))?;
        let datetime = date
            .and_hms_opt(u32::from(hour), u32::from(minute), u32::from(second))
            .ok_or(TimestampError::OutOfRange("time"))?;
        Self::from_datetime(&datetime)
    }

    /// Convert seconds since the Unix epoch (UTC) into a timestamp
    pub fn from_unix_seconds(secs: u64) -> Result<Self, TimestampError> {
        let secs = i64::try_from(secs).map_err(|_| TimestampError::OutOfRange("seconds"))?;
        let datetime = DateTime::from_timestamp(secs, 0)
            .ok_or(TimestampError::OutOfRange("seconds"))?
            .naive_utc();
        Self::from_datetime(&datetime)
    }

    /// Format a calendar date-time, whole seconds only
    pub fn from_datetime(datetime: &NaiveDateTime) -> Result<Self, TimestampError> {
        let mut inner = heapless::String::new();
        write!(inner, "{}", datetime.format(FORMAT))
            .map_err(|_| TimestampError::OutOfRange("year"))?;
        if inner.len() != TIMESTAMP_LEN {
            return Err(TimestampError::OutOfRange("year"));
        }
        Ok(Self(inner))
    }

    /// Calendar date-time this timestamp names
    pub fn to_datetime(&self) -> Result<NaiveDateTime, TimestampError> {
        NaiveDateTime::parse_from_str(self.as_str(), FORMAT).map_err(TimestampError::Invalid)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = heapless::String::<32>::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Real-time clock collaborator
pub trait Clock {
    /// Current wall-clock time
    fn now(&self) -> Timestamp;
}
