//! Wire format for instants: RFC 3339, millisecond precision, `Z` suffix.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serializer;

/// Format an instant the way the API emits it, e.g. `2024-01-01T09:00:00.000Z`.
pub fn format(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 instant with any offset, normalised to UTC.
pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|instant| instant.with_timezone(&Utc))
}

pub fn serialize<S>(instant: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(instant))
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_format_uses_millis_and_z() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        assert_eq!(format(&instant), "2024-01-01T09:00:00.000Z");
    }

    #[test]
    fn test_parse_normalises_offset() {
        let parsed = parse("2024-01-01T10:00:00+01:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse("not a date").is_none());
        assert!(parse("2024-13-01T00:00:00Z").is_none());
        assert!(parse("").is_none());
    }
}
