//! Serde codec for the backend's timestamp fields.
//!
//! # Design
//! The backend echoes whatever a browser `Date` serialized to, so values show
//! up as full RFC 3339 strings, naive date-times, or bare dates depending on
//! who wrote the record. Parsing is lenient; formatting always produces
//! RFC 3339 UTC with millisecond precision and a `Z` suffix.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Point in time as stored on a todo record.
pub type Timestamp = DateTime<Utc>;

/// Format a timestamp the way the backend stores it.
pub fn format(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse any of the accepted timestamp spellings. Returns `None` when the
/// input matches none of them.
pub fn parse(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn serialize<S: Serializer>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(ts))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw:?}")))
}

/// Codec for nullable timestamps. Any falsy value reads as `None`: `null`,
/// a missing field (with `#[serde(default)]`), `""`, `false` and `0`.
pub mod option {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Flag(bool),
        Number(f64),
    }

    pub fn serialize<S: Serializer>(ts: &Option<Timestamp>, serializer: S) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => serializer.serialize_str(&super::format(ts)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Timestamp>, D::Error> {
        match Option::<Raw>::deserialize(deserializer)? {
            None | Some(Raw::Flag(false)) => Ok(None),
            Some(Raw::Number(n)) if n == 0.0 => Ok(None),
            Some(Raw::Text(raw)) if raw.trim().is_empty() => Ok(None),
            Some(Raw::Text(raw)) => parse(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw:?}"))),
            Some(Raw::Flag(true)) => Err(serde::de::Error::custom("invalid timestamp: true")),
            Some(Raw::Number(n)) => Err(serde::de::Error::custom(format!("invalid timestamp: {n}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_with_millis_and_z_suffix() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 8, 30, 0).unwrap();
        assert_eq!(format(&ts), "2024-01-01T08:30:00.000Z");
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let ts = parse("2024-01-01T10:30:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 8, 30, 0).unwrap());
    }

    #[test]
    fn parses_browser_iso_string() {
        let ts = parse("2024-03-05T12:00:00.250Z").unwrap();
        assert_eq!(format(&ts), "2024-03-05T12:00:00.250Z");
    }

    #[test]
    fn parses_naive_date_time_as_utc() {
        let ts = parse("2024-01-01T08:30:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 8, 30, 0).unwrap());
    }

    #[test]
    fn parses_bare_date_as_midnight() {
        let ts = parse("2024-01-01").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("yesterday").is_none());
        assert!(parse("").is_none());
    }

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, with = "super::option")]
        at: Option<Timestamp>,
    }

    #[test]
    fn optional_reads_null_missing_and_empty_as_none() {
        for raw in [r#"{"at":null}"#, r#"{}"#, r#"{"at":""}"#, r#"{"at":false}"#, r#"{"at":0}"#] {
            let holder: Holder = serde_json::from_str(raw).unwrap();
            assert!(holder.at.is_none(), "{raw}");
        }
    }

    #[test]
    fn optional_rejects_garbage() {
        for raw in [r#"{"at":"soon"}"#, r#"{"at":true}"#, r#"{"at":1}"#] {
            let result: Result<Holder, _> = serde_json::from_str(raw);
            assert!(result.is_err(), "{raw}");
        }
    }
}
