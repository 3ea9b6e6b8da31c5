//! Timestamp parsing and the canonical wire form.
//!
//! Every timestamp sent to the remote store is UTC with millisecond
//! precision, e.g. `2024-01-01T09:00:00.000Z`. Inputs are more forgiving:
//! RFC 3339 with any offset, or naive date/date-time strings interpreted in
//! the session's time zone.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, SubsecRound, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::ValidationError;

/// `strftime` pattern of the canonical transmitted form.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Format a timestamp in the canonical wire form.
pub fn to_canonical(dt: &DateTime<Utc>) -> String {
    dt.format(CANONICAL_FORMAT).to_string()
}

/// Drop everything below the millisecond, the precision of the wire form.
pub fn truncate_to_millis(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.trunc_subsecs(3)
}

/// Parse user or wire input into a UTC timestamp.
///
/// Naive inputs (no offset) are read as wall-clock time in `tz`. A bare date
/// is midnight in `tz`. The result has millisecond precision.
pub fn parse_timestamp(input: &str, tz: Tz) -> Result<DateTime<Utc>, ValidationError> {
    parse_exact(input, tz).map(truncate_to_millis)
}

fn parse_exact(input: &str, tz: Tz) -> Result<DateTime<Utc>, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ValidationError::InvalidTimestamp("empty".into()));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return localize(naive, tz, input);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return localize(date.and_time(chrono::NaiveTime::MIN), tz, input);
    }

    Err(ValidationError::InvalidTimestamp(input.to_string()))
}

/// True if the input is a bare `YYYY-MM-DD` date.
pub fn is_date_only(input: &str) -> bool {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").is_ok()
}

fn localize(naive: NaiveDateTime, tz: Tz, input: &str) -> Result<DateTime<Utc>, ValidationError> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        // DST fold: the first occurrence wins
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(ValidationError::InvalidTimestamp(format!(
            "{input} does not exist in {tz}"
        ))),
    }
}

/// Serde adapter writing [`DateTime<Utc>`] in the canonical form.
pub mod canonical {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::to_canonical(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw, chrono_tz::UTC).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_form_has_millis_and_z() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        assert_eq!(to_canonical(&dt), "2024-01-01T09:00:00.000Z");
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let dt = parse_timestamp("2024-01-01T10:00:00+01:00", chrono_tz::UTC).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap());
    }

    #[test]
    fn parses_canonical_form() {
        let dt = parse_timestamp("2024-01-01T09:00:00.000Z", chrono_tz::UTC).unwrap();
        assert_eq!(to_canonical(&dt), "2024-01-01T09:00:00.000Z");
    }

    #[test]
    fn naive_input_uses_session_timezone() {
        let dt = parse_timestamp("2024-07-01T09:00", chrono_tz::Europe::Helsinki).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 7, 1, 6, 0, 0).unwrap());
    }

    #[test]
    fn bare_date_is_local_midnight() {
        let dt = parse_timestamp("2024-01-15", chrono_tz::UTC).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
        assert!(is_date_only("2024-01-15"));
        assert!(!is_date_only("2024-01-15T10:00"));
    }

    #[test]
    fn nonexistent_local_time_is_rejected() {
        // Clocks jump from 02:00 to 03:00 in New York on this date
        let result = parse_timestamp("2024-03-10T02:30", chrono_tz::America::New_York);
        assert!(matches!(result, Err(ValidationError::InvalidTimestamp(_))));
    }

    #[test]
    fn sub_millisecond_digits_are_dropped() {
        let dt = parse_timestamp("2024-01-01T09:00:00.123456Z", chrono_tz::UTC).unwrap();
        assert_eq!(to_canonical(&dt), "2024-01-01T09:00:00.123Z");
        assert_eq!(dt, parse_timestamp(&to_canonical(&dt), chrono_tz::UTC).unwrap());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_timestamp("next tuesday", chrono_tz::UTC).is_err());
        assert!(parse_timestamp("   ", chrono_tz::UTC).is_err());
    }
}
