//! ISO-8601 timestamp handling
//!
//! Timestamps live in memory as `DateTime<Utc>` truncated to whole seconds and
//! at rest as text in [`STORAGE_FORMAT`] (`2024-01-31T09:30:00`, no zone
//! suffix, always UTC). Conversion between the two happens here and nowhere
//! else.
//!
//! # Accepted input
//!
//! | Input                         | Meaning                          |
//! |-------------------------------|----------------------------------|
//! | `2024-01-31`                  | midnight UTC                     |
//! | `2024-01-31T09:30`            | minutes precision                |
//! | `2024-01-31 09:30`            | space separator                  |
//! | `2024-01-31T09:30:15.250`     | fraction dropped                 |
//! | `2024-01-31T09:30:15+03:00`   | offset converted to UTC          |
//!
//! # Example
//!
//! ```
//! use taskboard_shared::timestamp;
//!
//! let ts = timestamp::parse("2024-01-31 09:30").unwrap();
//! assert_eq!(timestamp::format(&ts), "2024-01-31T09:30:00");
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};

use crate::error::ValidationError;

/// Canonical text form used in the database and in serialized records
pub const STORAGE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Renders a timestamp in [`STORAGE_FORMAT`]
pub fn format(ts: &DateTime<Utc>) -> String {
    ts.format(STORAGE_FORMAT).to_string()
}

/// Parses ISO-8601 text into a second-precision UTC timestamp
///
/// # Errors
///
/// Returns `ValidationError::InvalidTimestamp` when the text matches none of
/// the accepted shapes.
pub fn parse(text: &str) -> Result<DateTime<Utc>, ValidationError> {
    let trimmed = text.trim();

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(truncate(with_offset.with_timezone(&Utc)));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(truncate(Utc.from_utc_datetime(&naive)));
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| ValidationError::InvalidTimestamp(text.to_string()))
}

/// Drops sub-second precision
pub fn truncate(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_nanosecond(0).unwrap_or(ts)
}

/// Current time at storage precision
pub fn now() -> DateTime<Utc> {
    truncate(Utc::now())
}

/// Anything an entity constructor accepts as a timestamp
///
/// Structured values are taken as UTC; text goes through [`parse`].
pub trait IntoTimestamp {
    fn into_timestamp(self) -> Result<DateTime<Utc>, ValidationError>;
}

impl IntoTimestamp for DateTime<Utc> {
    fn into_timestamp(self) -> Result<DateTime<Utc>, ValidationError> {
        Ok(truncate(self))
    }
}

impl IntoTimestamp for NaiveDateTime {
    fn into_timestamp(self) -> Result<DateTime<Utc>, ValidationError> {
        Ok(truncate(Utc.from_utc_datetime(&self)))
    }
}

impl IntoTimestamp for NaiveDate {
    fn into_timestamp(self) -> Result<DateTime<Utc>, ValidationError> {
        self.and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .ok_or_else(|| ValidationError::InvalidTimestamp(self.to_string()))
    }
}

impl IntoTimestamp for &str {
    fn into_timestamp(self) -> Result<DateTime<Utc>, ValidationError> {
        parse(self)
    }
}

impl IntoTimestamp for String {
    fn into_timestamp(self) -> Result<DateTime<Utc>, ValidationError> {
        parse(&self)
    }
}

impl IntoTimestamp for &String {
    fn into_timestamp(self) -> Result<DateTime<Utc>, ValidationError> {
        parse(self)
    }
}

/// Serde adapter writing timestamps in [`STORAGE_FORMAT`]
///
/// Use with `#[serde(with = "crate::timestamp::iso")]`.
pub mod iso {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format(ts))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        super::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn test_format_uses_storage_format() {
        assert_eq!(format(&utc(2024, 3, 5, 7, 8, 9)), "2024-03-05T07:08:09");
    }

    #[test]
    fn test_parse_full_iso() {
        assert_eq!(parse("2024-03-05T07:08:09").unwrap(), utc(2024, 3, 5, 7, 8, 9));
    }

    #[test]
    fn test_parse_space_separator_and_minutes() {
        assert_eq!(parse("2024-03-05 07:08").unwrap(), utc(2024, 3, 5, 7, 8, 0));
        assert_eq!(parse("2024-03-05T07:08").unwrap(), utc(2024, 3, 5, 7, 8, 0));
    }

    #[test]
    fn test_parse_date_only_is_midnight() {
        assert_eq!(parse("2024-03-05").unwrap(), utc(2024, 3, 5, 0, 0, 0));
    }

    #[test]
    fn test_parse_drops_fraction() {
        let ts = parse("2024-03-05T07:08:09.987654").unwrap();
        assert_eq!(ts, utc(2024, 3, 5, 7, 8, 9));
        assert_eq!(ts.nanosecond(), 0);
    }

    #[test]
    fn test_parse_offset_converted_to_utc() {
        assert_eq!(parse("2024-03-05T10:00:00+03:00").unwrap(), utc(2024, 3, 5, 7, 0, 0));
        assert_eq!(parse("2024-03-05T07:00:00Z").unwrap(), utc(2024, 3, 5, 7, 0, 0));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(parse("  2024-03-05  ").unwrap(), utc(2024, 3, 5, 0, 0, 0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "tomorrow", "2024-13-01", "05/03/2024", "2024-03-05T25:00:00"] {
            assert_eq!(
                parse(bad),
                Err(ValidationError::InvalidTimestamp(bad.to_string())),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_format_parse_round_trip() {
        let ts = utc(1999, 12, 31, 23, 59, 59);
        assert_eq!(parse(&format(&ts)).unwrap(), ts);
    }

    #[test]
    fn test_into_timestamp_truncates_structured_values() {
        let ts = utc(2024, 1, 1, 0, 0, 0) + chrono::Duration::milliseconds(750);
        assert_eq!(ts.into_timestamp().unwrap(), utc(2024, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_into_timestamp_from_naive_date() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(date.into_timestamp().unwrap(), utc(2024, 6, 1, 0, 0, 0));
    }

    #[test]
    fn test_now_has_no_fraction() {
        assert_eq!(now().nanosecond(), 0);
    }
}
