//! Timestamp parsing for feed records.
//!
//! Twtxt clients generally emit RFC 3339, but in the wild there is
//! sometimes a colon missing from the numeric offset, no offset at all,
//! or only minute precision. A fixed, ordered list of layouts is tried
//! and the first success wins.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{FeedError, Result};

/// Layouts carrying an explicit numeric offset, colon and compact styles.
const OFFSET_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%.f%:z",
    "%Y-%m-%dT%H:%M%.f%z",
];

/// Layouts with no zone designator; instants are taken as UTC.
const NAIVE_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M%.f",
];

/// Parse a raw timestamp token against the supported layouts.
///
/// The input is upper-cased first: some clients emit a lowercase `z`
/// zone designator. On total failure the last layout's error is surfaced.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let ts = raw.to_uppercase();

    if let Ok(dt) = DateTime::parse_from_rfc3339(&ts) {
        return Ok(dt.with_timezone(&Utc));
    }

    for layout in OFFSET_LAYOUTS {
        if let Ok(dt) = DateTime::parse_from_str(&ts, layout) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    // A bare `Z` marks UTC even on layouts RFC 3339 rejects,
    // e.g. minute precision.
    let naive = ts.strip_suffix('Z').unwrap_or(&ts);

    let mut last_err = None;
    for layout in NAIVE_LAYOUTS {
        match NaiveDateTime::parse_from_str(naive, layout) {
            Ok(dt) => return Ok(dt.and_utc()),
            Err(err) => last_err = Some(err),
        }
    }

    let reason = last_err
        .map(|err| err.to_string())
        .unwrap_or_else(|| "unrecognized layout".to_string());
    Err(FeedError::invalid_timestamp(raw, reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(parts: (i32, u32, u32, u32, u32, u32)) -> DateTime<Utc> {
        let (y, mo, d, h, mi, s) = parts;
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_fractional_seconds_colon_offset() {
        let dt = parse_timestamp("2020-07-18T10:39:52.132+02:00").unwrap();
        assert_eq!(dt, utc((2020, 7, 18, 8, 39, 52)) + chrono::Duration::milliseconds(132));
    }

    #[test]
    fn test_fractional_seconds_compact_offset() {
        let dt = parse_timestamp("2020-07-18T10:39:52.132+0200").unwrap();
        assert_eq!(dt, utc((2020, 7, 18, 8, 39, 52)) + chrono::Duration::milliseconds(132));
    }

    #[test]
    fn test_seconds_no_offset_is_utc() {
        let dt = parse_timestamp("2020-07-18T10:39:52").unwrap();
        assert_eq!(dt, utc((2020, 7, 18, 10, 39, 52)));
    }

    #[test]
    fn test_minute_precision_variants() {
        let want = utc((2020, 7, 18, 8, 39, 0));
        assert_eq!(parse_timestamp("2020-07-18T10:39+02:00").unwrap(), want);
        assert_eq!(parse_timestamp("2020-07-18T10:39+0200").unwrap(), want);
        assert_eq!(
            parse_timestamp("2020-07-18T10:39").unwrap(),
            utc((2020, 7, 18, 10, 39, 0))
        );
    }

    #[test]
    fn test_zulu_and_lowercase_zulu() {
        let want = utc((2020, 7, 18, 10, 39, 52));
        assert_eq!(parse_timestamp("2020-07-18T10:39:52Z").unwrap(), want);
        assert_eq!(parse_timestamp("2020-07-18t10:39:52z").unwrap(), want);
    }

    #[test]
    fn test_minute_precision_zulu() {
        assert_eq!(
            parse_timestamp("2020-07-18T10:39Z").unwrap(),
            utc((2020, 7, 18, 10, 39, 0))
        );
    }

    #[test]
    fn test_offset_notation_equivalence() {
        // The same instant in every supported notation.
        let want = parse_timestamp("2020-07-18T08:39:52Z").unwrap();
        for raw in [
            "2020-07-18T10:39:52+02:00",
            "2020-07-18T10:39:52+0200",
            "2020-07-18T08:39:52",
        ] {
            assert_eq!(parse_timestamp(raw).unwrap(), want, "layout {raw}");
        }
    }

    #[test]
    fn test_garbage_is_rejected() {
        let err = parse_timestamp("not-a-timestamp").unwrap_err();
        assert!(matches!(err, FeedError::InvalidTimestamp { .. }));
    }
}
