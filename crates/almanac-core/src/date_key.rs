//! Occurrence identity keys.
//!
//! A [`DateKey`] is the fixed-width, zero-padded local date-time string
//! (`YYYY-MM-DDTHH:MM:SS`, no zone suffix) that names one occurrence of a
//! recurring series. Because every key has the same width, plain string
//! comparison orders keys chronologically, so keys double as overlay map
//! keys, cache keys and sort keys.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Format string for date keys.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const DATE_KEY_LEN: usize = 19;

/// The canonical string identity of an occurrence.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(String);

impl DateKey {
    /// Builds the key for a local date-time.
    ///
    /// Years outside `0..=9999` would break the fixed width and are
    /// clamped into range.
    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        let dt = match dt.year() {
            y if y < 0 => dt.with_year(0).unwrap_or(dt),
            y if y > 9999 => dt.with_year(9999).unwrap_or(dt),
            _ => dt,
        };
        Self(dt.format(DATE_KEY_FORMAT).to_string())
    }

    /// Parses and validates a key string.
    pub fn parse(value: &str) -> Result<Self> {
        if value.len() != DATE_KEY_LEN {
            return Err(Error::invalid_date_key(value));
        }
        NaiveDateTime::parse_from_str(value, DATE_KEY_FORMAT)
            .map_err(|_| Error::invalid_date_key(value))?;
        Ok(Self(value.to_string()))
    }

    /// Returns the local date-time this key names.
    pub fn to_datetime(&self) -> NaiveDateTime {
        // Construction always goes through `parse` or `from_datetime`.
        NaiveDateTime::parse_from_str(&self.0, DATE_KEY_FORMAT).unwrap_or_default()
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<NaiveDateTime> for DateKey {
    fn from(dt: NaiveDateTime) -> Self {
        Self::from_datetime(dt)
    }
}

impl FromStr for DateKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Parses a local date-time in date-key format.
pub fn parse_local(value: &str) -> Result<NaiveDateTime> {
    DateKey::parse(value).map(|key| key.to_datetime())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn formats_fixed_width() {
        let key = DateKey::from_datetime(dt(2024, 1, 5, 9, 3, 0));
        assert_eq!(key.as_str(), "2024-01-05T09:03:00");
        assert_eq!(key.to_datetime(), dt(2024, 1, 5, 9, 3, 0));
    }

    #[test]
    fn string_order_is_chronological() {
        let a = DateKey::from_datetime(dt(2024, 9, 30, 23, 0, 0));
        let b = DateKey::from_datetime(dt(2024, 10, 1, 0, 0, 0));
        assert!(a < b);
        assert!(a.as_str() < b.as_str());
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(DateKey::parse("2024-1-5T09:00:00").is_err());
        assert!(DateKey::parse("2024-01-05T09:00:00Z").is_err());
        assert!(DateKey::parse("2024-02-30T09:00:00").is_err());
        assert!(DateKey::parse("2024-02-29T09:00:00").is_ok());
    }

    #[test]
    fn serde_uses_plain_string() {
        let key = DateKey::from_datetime(dt(2024, 3, 1, 12, 0, 0));
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"2024-03-01T12:00:00\"");
        let back: DateKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
        assert!(serde_json::from_str::<DateKey>("\"nope\"").is_err());
    }
}
