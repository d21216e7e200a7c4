//! HL7 partial-precision timestamp parsing.
//!
//! CDA `effectiveTime` values use the compact HL7 `TS` form:
//!
//! ```text
//! YYYY[MM[DD[HH[MM[SS[.F+]]]]]][+|-ZZZZ]
//! ```
//!
//! Digits may be dropped from the right to express less precision. The
//! parser keeps exactly the groups that were written; nothing is defaulted.
//! A value that is present but does not follow the format is rejected with
//! [`TimestampError::Malformed`] rather than guessed at.

use cda_model::{PartialTimestamp, Result, TimestampError};

const YEAR_DIGITS: usize = 4;
const GROUP_DIGITS: usize = 2;
const OFFSET_LEN: usize = 5;

/// Parses an optional attribute value.
///
/// An absent or empty value means "no date known" and yields `Ok(None)`.
pub fn parse_timestamp(value: Option<&str>) -> Result<Option<PartialTimestamp>> {
    match value {
        None | Some("") => Ok(None),
        Some(value) => parse_hl7(value).map(Some),
    }
}

/// Parses a present HL7 timestamp string.
pub fn parse_hl7(value: &str) -> Result<PartialTimestamp> {
    let (body, offset) = split_offset(value)?;
    let (digits, fraction) = match body.split_once('.') {
        Some((digits, fraction)) => (digits, Some(fraction)),
        None => (body, None),
    };

    if let Some(ch) = digits.chars().find(|ch| !ch.is_ascii_digit()) {
        return Err(TimestampError::malformed(
            value,
            format!("unexpected character '{ch}'"),
        ));
    }
    if digits.len() < YEAR_DIGITS {
        return Err(TimestampError::malformed(value, "year must have 4 digits"));
    }

    let year = parse_group(&digits[..YEAR_DIGITS]) as i32;
    let mut timestamp = PartialTimestamp::new(year);
    let mut rest = &digits[YEAR_DIGITS..];
    while !rest.is_empty() {
        let Some(next) = timestamp.precision().next() else {
            return Err(TimestampError::malformed(
                value,
                "unexpected digits after seconds",
            ));
        };
        if rest.len() < GROUP_DIGITS {
            return Err(TimestampError::malformed(
                value,
                format!("incomplete {next} group"),
            ));
        }
        let component = parse_group(&rest[..GROUP_DIGITS]);
        if !timestamp.accepts_next(component) {
            return Err(TimestampError::malformed(
                value,
                format!("{next} {component:02} out of range"),
            ));
        }
        timestamp = timestamp
            .extend(component)
            .ok_or_else(|| TimestampError::malformed(value, "too many digit groups"))?;
        rest = &rest[GROUP_DIGITS..];
    }

    if let Some(fraction) = fraction {
        if fraction.is_empty() || !fraction.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(TimestampError::malformed(
                value,
                "fractional seconds must be digits",
            ));
        }
        timestamp = timestamp.with_fraction(fraction).ok_or_else(|| {
            TimestampError::malformed(value, "fractional seconds require a seconds group")
        })?;
    }

    if let Some(offset) = offset {
        timestamp = timestamp.with_offset_minutes(offset);
    }
    Ok(timestamp)
}

/// Splits a trailing `+ZZZZ` / `-ZZZZ` offset, returning it in minutes.
fn split_offset(value: &str) -> Result<(&str, Option<i32>)> {
    let bytes = value.as_bytes();
    if bytes.len() < OFFSET_LEN {
        return Ok((value, None));
    }
    let split = bytes.len() - OFFSET_LEN;
    let sign = match bytes[split] {
        b'+' => 1,
        b'-' => -1,
        _ => return Ok((value, None)),
    };
    let digits = &value[split + 1..];
    if !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return Ok((value, None));
    }
    let hours = parse_group(&digits[..2]);
    let minutes = parse_group(&digits[2..]);
    if hours > 23 || minutes > 59 {
        return Err(TimestampError::malformed(
            value,
            format!("offset {digits} out of range"),
        ));
    }
    let offset = sign * (hours * 60 + minutes) as i32;
    Ok((&value[..split], Some(offset)))
}

/// Numeric value of an all-ASCII-digit slice.
fn parse_group(digits: &str) -> u32 {
    digits
        .bytes()
        .fold(0, |acc, byte| acc * 10 + u32::from(byte - b'0'))
}

#[cfg(test)]
mod tests {
    use cda_model::Precision;

    use super::*;

    #[test]
    fn year_only() {
        let ts = parse_hl7("2020").unwrap();
        assert_eq!(ts.precision(), Precision::Year);
        assert_eq!(ts.year(), 2020);
        assert_eq!(ts.month(), None);
        assert_eq!(ts.day(), None);
        assert_eq!(ts.offset_minutes(), None);
    }

    #[test]
    fn year_month() {
        let ts = parse_hl7("202003").unwrap();
        assert_eq!(ts.precision(), Precision::Month);
        assert_eq!(ts.month(), Some(3));
        assert_eq!(ts.day(), None);
    }

    #[test]
    fn hour_precision() {
        let ts = parse_hl7("2020031514").unwrap();
        assert_eq!(ts.precision(), Precision::Hour);
        assert_eq!(ts.hour(), Some(14));
        assert_eq!(ts.minute(), None);
    }

    #[test]
    fn full_datetime_with_negative_offset() {
        let ts = parse_hl7("20200315143000-0500").unwrap();
        assert_eq!(ts.precision(), Precision::Second);
        assert_eq!(ts.year(), 2020);
        assert_eq!(ts.month(), Some(3));
        assert_eq!(ts.day(), Some(15));
        assert_eq!(ts.hour(), Some(14));
        assert_eq!(ts.minute(), Some(30));
        assert_eq!(ts.second(), Some(0));
        assert_eq!(ts.offset_minutes(), Some(-300));
    }

    #[test]
    fn positive_offset_with_minutes() {
        let ts = parse_hl7("202003151430+0530").unwrap();
        assert_eq!(ts.precision(), Precision::Minute);
        assert_eq!(ts.offset_minutes(), Some(330));
    }

    #[test]
    fn offset_on_year_only() {
        let ts = parse_hl7("2020-0300").unwrap();
        assert_eq!(ts.precision(), Precision::Year);
        assert_eq!(ts.offset_minutes(), Some(-180));
    }

    #[test]
    fn fractional_seconds() {
        let ts = parse_hl7("20130703094812.1234+0100").unwrap();
        assert_eq!(ts.precision(), Precision::FractionalSecond);
        assert_eq!(ts.second(), Some(12));
        assert_eq!(ts.fraction(), Some("1234"));
        assert_eq!(ts.offset_minutes(), Some(60));
    }

    #[test]
    fn absent_and_empty_are_none() {
        assert_eq!(parse_timestamp(None), Ok(None));
        assert_eq!(parse_timestamp(Some("")), Ok(None));
    }

    #[test]
    fn hyphenated_date_is_malformed() {
        let error = parse_hl7("2020-03").unwrap_err();
        assert_eq!(error.value(), "2020-03");
    }

    #[test]
    fn rejects_short_year() {
        assert!(parse_hl7("202").is_err());
        assert!(parse_hl7("+0500").is_err());
    }

    #[test]
    fn rejects_partial_group() {
        assert!(parse_hl7("20200").is_err());
        assert!(parse_hl7("2020031").is_err());
        assert!(parse_hl7("2020031514300").is_err());
    }

    #[test]
    fn rejects_digits_beyond_seconds() {
        assert!(parse_hl7("2020031514300001").is_err());
    }

    #[test]
    fn rejects_out_of_range_components() {
        assert!(parse_hl7("202013").is_err());
        assert!(parse_hl7("202000").is_err());
        assert!(parse_hl7("20210229").is_err());
        assert!(parse_hl7("20200229").is_ok());
        assert!(parse_hl7("2020031524").is_err());
        assert!(parse_hl7("202003151460").is_err());
        assert!(parse_hl7("20200315143061").is_err());
        assert!(parse_hl7("20200315143060").is_ok());
    }

    #[test]
    fn rejects_bad_offset() {
        assert!(parse_hl7("20200315+0575").is_err());
    }

    #[test]
    fn rejects_fraction_without_seconds() {
        assert!(parse_hl7("202003151430.5").is_err());
        assert!(parse_hl7("20200315143000.").is_err());
        assert!(parse_hl7("20200315143000.5a").is_err());
    }

    #[test]
    fn rejects_whitespace() {
        assert!(parse_hl7(" 2020").is_err());
        assert!(parse_hl7("2020 ").is_err());
    }

    #[test]
    fn rejects_non_ascii_digits() {
        assert!(parse_hl7("２０２０").is_err());
    }

    #[test]
    fn display_roundtrips_input() {
        for input in ["2020", "202003", "20200315143000-0500", "20130703094812.1234+0100"] {
            assert_eq!(parse_hl7(input).unwrap().to_string(), input);
        }
    }
}
