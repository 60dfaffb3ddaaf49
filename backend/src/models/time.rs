//! Timestamp handling for grounding-event milestones.
//!
//! Milestones arrive from data entry, spreadsheet imports and older exports, so
//! parsing is fail-soft: anything that cannot be read as an instant becomes
//! `None` instead of an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Milliseconds in one hour.
pub const MILLIS_PER_HOUR: f64 = 3_600_000.0;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a timestamp string, returning `None` for anything unreadable.
///
/// Accepted forms: RFC 3339, naive date-times (interpreted as UTC) and plain
/// dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Convert epoch milliseconds to an instant, `None` when out of range.
pub fn from_epoch_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

/// Elapsed hours from `earlier` to `later`, clamped to zero for out-of-order input.
pub fn hours_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    let millis = (later - earlier).num_milliseconds() as f64;
    (millis / MILLIS_PER_HOUR).max(0.0)
}

/// Serde adapter for optional milestone timestamps that never fails.
///
/// Strings go through [`parse_timestamp`], integers are epoch milliseconds,
/// everything else (including `null` and wrong types) becomes `None`.
pub mod lenient {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.and_then(|v| from_value(&v)))
    }

    pub(crate) fn from_value(value: &Value) -> Option<DateTime<Utc>> {
        let parsed = match value {
            Value::String(s) => super::parse_timestamp(s),
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .and_then(super::from_epoch_millis),
            Value::Null => return None,
            _ => None,
        };

        if parsed.is_none() {
            log::debug!("Ignoring unreadable timestamp value: {}", value);
        }
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let dt = parse_timestamp("2024-03-01T10:00:00+02:00").unwrap();
        assert_eq!(dt, t0());
    }

    #[test]
    fn test_parse_naive_datetime_as_utc() {
        assert_eq!(parse_timestamp("2024-03-01 08:00:00"), Some(t0()));
        assert_eq!(parse_timestamp("2024-03-01T08:00:00"), Some(t0()));
        assert_eq!(parse_timestamp("2024-03-01 08:00"), Some(t0()));
    }

    #[test]
    fn test_parse_plain_date_is_midnight() {
        let dt = parse_timestamp("2024-03-01").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_garbage_is_none() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("   "), None);
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp("2024-13-45"), None);
    }

    #[test]
    fn test_epoch_millis() {
        let millis = t0().timestamp_millis();
        assert_eq!(from_epoch_millis(millis), Some(t0()));
    }

    #[test]
    fn test_hours_between_forward() {
        let later = t0() + chrono::Duration::minutes(90);
        assert!((hours_between(t0(), later) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_hours_between_clamps_reversed_input() {
        let earlier = t0() - chrono::Duration::hours(5);
        assert_eq!(hours_between(t0(), earlier), 0.0);
    }

    #[test]
    fn test_lenient_values() {
        use serde_json::json;
        assert_eq!(lenient::from_value(&json!("2024-03-01T08:00:00Z")), Some(t0()));
        assert_eq!(lenient::from_value(&json!(t0().timestamp_millis())), Some(t0()));
        assert_eq!(lenient::from_value(&json!(null)), None);
        assert_eq!(lenient::from_value(&json!(true)), None);
        assert_eq!(lenient::from_value(&json!({"$date": "x"})), None);
    }
}
