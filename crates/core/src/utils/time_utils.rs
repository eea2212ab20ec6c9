//! Timestamp parsing for server payloads.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses an RFC 3339 timestamp, or a timestamp without offset which is
/// taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
}

/// Deserializes an optional timestamp with or without an offset.
///
/// Null and empty strings become `None`.
pub fn deserialize_option_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid timestamp '{}'", raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_parse_timestamp_with_offset() {
        let parsed = parse_timestamp("2024-05-01T09:30:00.123456+02:00").unwrap();
        assert_eq!(parsed.hour(), 7);
        assert_eq!(parsed.nanosecond(), 123_456_000);
    }

    #[test]
    fn test_parse_timestamp_naive_is_utc() {
        assert_eq!(
            parse_timestamp("2024-05-01T09:30:00"),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp("2024-05-01 09:30:00.5").map(|t| t.second()),
            Some(0)
        );
        assert_eq!(
            parse_timestamp("2024-05-01T09:30:00Z"),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2024-05-01").is_none());
    }
}
