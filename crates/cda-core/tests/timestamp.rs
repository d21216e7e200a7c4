//! Property tests for HL7 timestamp parsing.

use cda_core::{parse_hl7, parse_timestamp};
use cda_model::Precision;
use proptest::prelude::*;

const PRECISIONS: [Precision; 6] = [
    Precision::Year,
    Precision::Month,
    Precision::Day,
    Precision::Hour,
    Precision::Minute,
    Precision::Second,
];

/// A valid timestamp and the number of groups after the year.
fn valid_timestamp() -> impl Strategy<Value = (String, usize)> {
    (
        1900u32..2100,
        1u32..=12,
        1u32..=28,
        0u32..24,
        0u32..60,
        0u32..60,
        0usize..=5,
    )
        .prop_map(|(year, month, day, hour, minute, second, groups)| {
            let parts = [month, day, hour, minute, second];
            let mut value = format!("{year:04}");
            for part in &parts[..groups] {
                value.push_str(&format!("{part:02}"));
            }
            (value, groups)
        })
}

proptest! {
    #[test]
    fn precision_matches_group_count((value, groups) in valid_timestamp()) {
        let ts = parse_hl7(&value).unwrap();
        prop_assert_eq!(ts.precision(), PRECISIONS[groups]);
        prop_assert_eq!(ts.month().is_some(), groups >= 1);
        prop_assert_eq!(ts.day().is_some(), groups >= 2);
        prop_assert_eq!(ts.hour().is_some(), groups >= 3);
        prop_assert_eq!(ts.minute().is_some(), groups >= 4);
        prop_assert_eq!(ts.second().is_some(), groups >= 5);
        prop_assert_eq!(ts.offset_minutes(), None);
        prop_assert_eq!(ts.to_string(), value);
    }

    #[test]
    fn offset_sign_and_magnitude(
        (value, _groups) in valid_timestamp(),
        negative in any::<bool>(),
        hours in 0i32..24,
        minutes in 0i32..60,
    ) {
        let sign = if negative { '-' } else { '+' };
        let input = format!("{value}{sign}{hours:02}{minutes:02}");
        let ts = parse_hl7(&input).unwrap();
        let expected = (hours * 60 + minutes) * if negative { -1 } else { 1 };
        prop_assert_eq!(ts.offset_minutes(), Some(expected));
    }

    #[test]
    fn odd_trailing_digit_is_rejected((value, groups) in valid_timestamp(), digit in 0u32..10) {
        prop_assume!(groups < 5);
        let input = format!("{value}{digit}");
        prop_assert!(parse_hl7(&input).is_err());
    }

    #[test]
    fn never_panics(input in "\\PC{0,24}") {
        let _ = parse_timestamp(Some(&input));
    }
}
