//! Flexible timestamps
//!
//! [`FlexTime`] decodes from a JSON string or number using a permissive
//! grammar and always normalizes to UTC. It encodes as RFC 3339 with
//! nanosecond precision, which the grammar accepts, so re-decoding an
//! encoded value yields the same instant.
//!
//! # Accepted Inputs
//!
//! | Shape | Example |
//! |-------|---------|
//! | RFC 3339 / ISO 8601 | `2018-09-11T20:15:50.123Z`, `2018-09-11T20:15:50+02:00` |
//! | RFC 2822 / RFC 1123 | `Tue, 11 Sep 2018 20:15:50 +0000`, `Tue, 11 Sep 2018 20:15:50 GMT` |
//! | Date and time | `2018-09-11 20:15:50`, `2018/09/11 20:15`, `09/11/2018 20:15:50` |
//! | Date only | `2018-09-11`, `2018/09/11`, `09/11/2018`, `Sep 11, 2018`, `11 September 2018` |
//! | 12-hour clock | `09/11/2018 8:15 PM`, `2018-09-11 8:15:50 pm` |
//! | Month names | `Sep 11 2018`, `September 11 2018 20:15` |
//! | C/Unix date | `Tue Sep 11 20:15:50 2018`, `Tue Sep 11 20:15:50 UTC 2018` |
//! | Go `Time.String` | `2018-09-11 20:15:50.123 +0000 UTC m=+0.000123` |
//! | Zone names | `2018-09-11 13:15:50 PDT`, `Tue Sep 11 13:15:50 PDT 2018` |
//! | Digits | `2018` (year), `20180911`, `20180911201550`, unix s/ms/µs/ns |
//!
//! A numeric offset wins over a zone name written next to it. Inputs with
//! neither are read as UTC.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{json_type_name, DecodeError};

/// Formats carrying an explicit numeric offset
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M:%S%.f %:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%a %b %e %H:%M:%S %z %Y",
    "%d %b %Y %H:%M:%S %z",
];

/// Formats without an offset, read as UTC
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%Y-%m-%d %I:%M:%S %p",
    "%Y-%m-%d %I:%M %p",
    "%a %b %e %H:%M:%S %Y",
    "%a, %d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%b %e, %Y %H:%M:%S",
    "%b %e %Y %H:%M:%S",
    "%b %e %Y %H:%M",
    "%B %e %Y %H:%M:%S",
    "%B %e %Y %H:%M",
    "%b %e %Y %I:%M %p",
    "%Y%m%d%H%M%S",
];

/// Date-only formats, read as midnight UTC
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%Y%m%d",
    "%b %e, %Y",
    "%B %e, %Y",
    "%b %e %Y",
    "%B %e %Y",
    "%e %b %Y",
    "%e %B %Y",
    "%d-%b-%Y",
];

const HOUR: i32 = 3600;

/// Zone abbreviations and their offsets east of UTC, in seconds
///
/// Ambiguous names such as `IST` are left out.
const ZONE_OFFSETS: &[(&str, i32)] = &[
    ("UTC", 0),
    ("UT", 0),
    ("GMT", 0),
    ("Z", 0),
    ("EST", -5 * HOUR),
    ("EDT", -4 * HOUR),
    ("CST", -6 * HOUR),
    ("CDT", -5 * HOUR),
    ("MST", -7 * HOUR),
    ("MDT", -6 * HOUR),
    ("PST", -8 * HOUR),
    ("PDT", -7 * HOUR),
    ("AKST", -9 * HOUR),
    ("AKDT", -8 * HOUR),
    ("HST", -10 * HOUR),
    ("WET", 0),
    ("WEST", HOUR),
    ("BST", HOUR),
    ("CET", HOUR),
    ("CEST", 2 * HOUR),
    ("EET", 2 * HOUR),
    ("EEST", 3 * HOUR),
    ("MSK", 3 * HOUR),
    ("SGT", 8 * HOUR),
    ("HKT", 8 * HOUR),
    ("JST", 9 * HOUR),
    ("KST", 9 * HOUR),
    ("AEST", 10 * HOUR),
    ("AEDT", 11 * HOUR),
    ("NZST", 12 * HOUR),
    ("NZDT", 13 * HOUR),
];

/// A UTC timestamp decoded with a permissive date/time grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlexTime(DateTime<Utc>);

impl FlexTime {
    /// Wrap a UTC instant
    pub fn new(time: DateTime<Utc>) -> Self {
        FlexTime(time)
    }

    /// Parse text in any accepted format
    pub fn parse(input: &str) -> Result<Self, DecodeError> {
        parse_any(input).map(FlexTime)
    }

    /// The wrapped instant
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// RFC 3339 text with nanosecond precision, as written to the store
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl From<DateTime<Utc>> for FlexTime {
    fn from(time: DateTime<Utc>) -> Self {
        FlexTime(time)
    }
}

impl FromStr for FlexTime {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FlexTime::parse(s)
    }
}

impl fmt::Display for FlexTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl Serialize for FlexTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for FlexTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = match Value::deserialize(deserializer)? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            other => {
                return Err(D::Error::custom(DecodeError::UnexpectedType {
                    expected: "string or number",
                    found: json_type_name(&other),
                }))
            }
        };
        FlexTime::parse(&text).map_err(D::Error::custom)
    }
}

/// Parse a timestamp in any accepted format, normalized to UTC
pub fn parse_any(input: &str) -> Result<DateTime<Utc>, DecodeError> {
    let s = input.trim();
    let invalid = || DecodeError::InvalidTimestamp {
        input: input.to_string(),
    };
    if s.is_empty() {
        return Err(invalid());
    }

    if let Some(time) = parse_numeric(s) {
        return Ok(time);
    }
    if let Some(time) = parse_with_offset(s) {
        return Ok(time);
    }

    let (rest, zone_offset) = split_zone(s);
    if zone_offset.is_some() {
        if let Some(time) = parse_with_offset(&rest) {
            return Ok(time);
        }
    }
    parse_naive(&rest)
        .and_then(|local| at_offset(local, zone_offset.unwrap_or(0)))
        .ok_or_else(invalid)
}

/// Formats that carry their own numeric offset
fn parse_with_offset(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(time) = DateTime::parse_from_rfc3339(s) {
        return Some(time.with_timezone(&Utc));
    }
    if let Ok(time) = DateTime::parse_from_rfc2822(s) {
        return Some(time.with_timezone(&Utc));
    }
    OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(s, format).ok())
        .map(|time| time.with_timezone(&Utc))
}

fn zone_offset(word: &str) -> Option<i32> {
    ZONE_OFFSETS
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, offset)| *offset)
}

/// Remove the first zone name and any Go monotonic reading (`m=+0.0012`)
///
/// Returns the remaining text and the zone's offset, if a zone was named.
/// A bare trailing `Z` counts as UTC.
fn split_zone(s: &str) -> (String, Option<i32>) {
    let mut offset = None;
    let kept: Vec<&str> = s
        .split_whitespace()
        .filter(|word| !word.starts_with("m=+") && !word.starts_with("m=-"))
        .filter(|word| match zone_offset(word) {
            Some(o) if offset.is_none() => {
                offset = Some(o);
                false
            }
            _ => true,
        })
        .collect();
    let rest = kept.join(" ");
    if offset.is_none() {
        if let Some(stripped) = rest.strip_suffix('Z') {
            return (stripped.to_string(), Some(0));
        }
    }
    (rest, offset)
}

fn at_offset(local: NaiveDateTime, offset_secs: i32) -> Option<DateTime<Utc>> {
    FixedOffset::east_opt(offset_secs)?
        .from_local_datetime(&local)
        .single()
        .map(|time| time.with_timezone(&Utc))
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(time) = NaiveDateTime::parse_from_str(s, format) {
            return Some(time);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Digit-only inputs: years, compact dates, and unix epochs
fn parse_numeric(s: &str) -> Option<DateTime<Utc>> {
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if let Some(frac) = frac_part {
        // Fractional unix seconds
        if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let secs: i64 = int_part.parse().ok()?;
        let mut digits: String = frac.chars().take(9).collect();
        while digits.len() < 9 {
            digits.push('0');
        }
        let nanos: u32 = digits.parse().ok()?;
        return Utc.timestamp_opt(secs, nanos).single();
    }

    match int_part.len() {
        4 => {
            let year: i32 = int_part.parse().ok()?;
            NaiveDate::from_ymd_opt(year, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|t| Utc.from_utc_datetime(&t))
        }
        8 => NaiveDate::parse_from_str(int_part, "%Y%m%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|t| Utc.from_utc_datetime(&t)),
        14 => NaiveDateTime::parse_from_str(int_part, "%Y%m%d%H%M%S")
            .ok()
            .map(|t| Utc.from_utc_datetime(&t)),
        len => {
            let n: i64 = int_part.parse().ok()?;
            match len {
                1..=3 | 5..=7 | 9..=11 => Utc.timestamp_opt(n, 0).single(),
                12 | 13 => Utc.timestamp_millis_opt(n).single(),
                15 | 16 => Some(Utc.timestamp_nanos(n.checked_mul(1_000)?)),
                17..=19 => Some(Utc.timestamp_nanos(n)),
                _ => None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use proptest::prelude::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_rfc3339_with_offset_normalizes_to_utc() {
        let t = parse_any("2018-09-11T22:15:50+02:00").unwrap();
        assert_eq!(t, utc(2018, 9, 11, 20, 15, 50));
    }

    #[test]
    fn test_rfc3339_nanos() {
        let t = parse_any("2018-09-11T20:15:50.123456789Z").unwrap();
        assert_eq!(t.timestamp_subsec_nanos(), 123_456_789);
    }

    #[test]
    fn test_textual_formats() {
        let expected = utc(2018, 9, 11, 20, 15, 50);
        for input in [
            "2018-09-11 20:15:50",
            "2018-09-11 20:15:50 UTC",
            "2018-09-11 20:15:50 +0000",
            "2018/09/11 20:15:50",
            "09/11/2018 20:15:50",
            "Tue, 11 Sep 2018 20:15:50 +0000",
            "Tue, 11 Sep 2018 20:15:50 GMT",
            "Tue Sep 11 20:15:50 2018",
            "Tue Sep 11 20:15:50 UTC 2018",
            "20180911201550",
        ] {
            assert_eq!(parse_any(input).unwrap(), expected, "input {input:?}");
        }
    }

    #[test]
    fn test_date_only_formats() {
        let expected = utc(2018, 9, 11, 0, 0, 0);
        for input in [
            "2018-09-11",
            "2018/09/11",
            "09/11/2018",
            "20180911",
            "Sep 11, 2018",
            "September 11, 2018",
            "11 September 2018",
        ] {
            assert_eq!(parse_any(input).unwrap(), expected, "input {input:?}");
        }
    }

    #[test]
    fn test_go_time_string() {
        let expected = utc(2018, 9, 11, 20, 15, 50) + chrono::Duration::milliseconds(123);
        assert_eq!(parse_any("2018-09-11 20:15:50.123 +0000 UTC").unwrap(), expected);
        assert_eq!(
            parse_any("2018-09-11 20:15:50.123 +0000 UTC m=+0.001234567").unwrap(),
            expected
        );
        assert_eq!(parse_any("2018-09-11 13:15:50.123 -0700 PDT").unwrap(), expected);
    }

    #[test]
    fn test_numeric_offset_wins_over_zone_name() {
        assert_eq!(
            parse_any("2018-09-11 20:15:50 +0000 PST").unwrap(),
            utc(2018, 9, 11, 20, 15, 50)
        );
    }

    #[test]
    fn test_twelve_hour_clock() {
        assert_eq!(
            parse_any("12/31/2018 8:05 PM").unwrap(),
            utc(2018, 12, 31, 20, 5, 0)
        );
        assert_eq!(
            parse_any("12/31/2018 8:05:30 am").unwrap(),
            utc(2018, 12, 31, 8, 5, 30)
        );
        assert_eq!(
            parse_any("2018-12-31 12:05 AM").unwrap(),
            utc(2018, 12, 31, 0, 5, 0)
        );
    }

    #[test]
    fn test_month_names_without_comma() {
        assert_eq!(parse_any("Sep 11 2018").unwrap(), utc(2018, 9, 11, 0, 0, 0));
        assert_eq!(
            parse_any("September 11 2018").unwrap(),
            utc(2018, 9, 11, 0, 0, 0)
        );
        assert_eq!(
            parse_any("September 11 2018 20:15").unwrap(),
            utc(2018, 9, 11, 20, 15, 0)
        );
    }

    #[test]
    fn test_zone_abbreviations_apply_offset() {
        let expected = utc(2018, 9, 12, 4, 15, 50);
        assert_eq!(parse_any("2018-09-11 20:15:50 PST").unwrap(), expected);
        assert_eq!(parse_any("Tue Sep 11 20:15:50 PST 2018").unwrap(), expected);
        assert_eq!(
            parse_any("2018-09-11 20:15:50 JST").unwrap(),
            utc(2018, 9, 11, 11, 15, 50)
        );
    }

    #[test]
    fn test_unknown_zone_name_rejected() {
        assert!(parse_any("2018-09-11 20:15:50 XYZ").is_err());
    }

    #[test]
    fn test_unix_epochs() {
        let expected = utc(2018, 9, 11, 20, 15, 50);
        assert_eq!(parse_any("1536696950").unwrap(), expected);
        assert_eq!(parse_any("1536696950000").unwrap(), expected);
        assert_eq!(parse_any("1536696950000000").unwrap(), expected);
        assert_eq!(parse_any("1536696950000000000").unwrap(), expected);
        assert_eq!(
            parse_any("1536696950.5").unwrap().timestamp_subsec_millis(),
            500
        );
    }

    #[test]
    fn test_year_only() {
        assert_eq!(parse_any("2018").unwrap().year(), 2018);
    }

    #[test]
    fn test_rejects_garbage() {
        for input in ["", "   ", "yesterday", "2018-13-45", "12ab", "1.2.3"] {
            let err = parse_any(input).unwrap_err();
            assert!(matches!(err, DecodeError::InvalidTimestamp { .. }), "{input:?}");
        }
    }

    #[test]
    fn test_deserialize_number_and_string() {
        let from_number: FlexTime = serde_json::from_str("1536696950").unwrap();
        let from_string: FlexTime = serde_json::from_str("\"2018-09-11T20:15:50Z\"").unwrap();
        assert_eq!(from_number, from_string);
    }

    #[test]
    fn test_deserialize_rejects_bool() {
        assert!(serde_json::from_str::<FlexTime>("true").is_err());
    }

    #[test]
    fn test_serialize_is_rfc3339_utc() {
        let t = FlexTime::new(utc(2018, 9, 11, 20, 15, 50));
        assert_eq!(
            serde_json::to_string(&t).unwrap(),
            "\"2018-09-11T20:15:50Z\""
        );
    }

    proptest! {
        #[test]
        fn prop_format_then_redecode_is_idempotent(
            secs in 0i64..4_102_444_800,
            nanos in 0u32..1_000_000_000,
        ) {
            let original = FlexTime::new(Utc.timestamp_opt(secs, nanos).unwrap());
            let text = original.to_rfc3339();
            let decoded = FlexTime::parse(&text).unwrap();
            prop_assert_eq!(decoded, original);
            prop_assert_eq!(decoded.to_rfc3339(), text);
        }

        #[test]
        fn prop_unix_seconds_decode_deterministically(secs in 1_000_000_000i64..9_999_999_999) {
            let text = secs.to_string();
            let first = FlexTime::parse(&text).unwrap();
            let second = FlexTime::parse(&first.to_rfc3339()).unwrap();
            prop_assert_eq!(first, second);
            prop_assert_eq!(first.as_datetime().timestamp(), secs);
        }
    }
}
