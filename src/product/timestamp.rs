//! Creation timestamp codec
//!
//! Timestamps are written as RFC 3339 in UTC with nine fractional digits so
//! they round-trip without losing precision. An absent timestamp is written
//! as an empty string in the durable record and as `null` in snapshots.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Formats a timestamp as nanosecond-precision RFC 3339 (`...Z`)
pub fn format(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parses an RFC 3339 timestamp, treating an empty string as absent
pub fn parse(text: &str) -> Result<Option<DateTime<Utc>>, chrono::ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let parsed = DateTime::parse_from_rfc3339(text)?;
    Ok(Some(parsed.with_timezone(&Utc)))
}

pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(at) => serializer.serialize_str(&format(at)),
        None => serializer.serialize_none(),
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        Some(text) => parse(&text).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_format_keeps_nanoseconds() {
        let at = Utc
            .with_ymd_and_hms(2019, 4, 22, 1, 4, 16)
            .unwrap()
            .with_nanosecond(292_932_000)
            .unwrap();
        assert_eq!(format(&at), "2019-04-22T01:04:16.292932000Z");
    }

    #[test]
    fn test_parse_roundtrip() {
        let at = Utc::now();
        assert_eq!(parse(&format(&at)).unwrap(), Some(at));
    }

    #[test]
    fn test_parse_accepts_short_fraction() {
        let parsed = parse("2019-04-22T01:04:16.292932Z").unwrap().unwrap();
        assert_eq!(parsed.nanosecond(), 292_932_000);
    }

    #[test]
    fn test_parse_empty_is_none() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse("yesterday").is_err());
    }
}
