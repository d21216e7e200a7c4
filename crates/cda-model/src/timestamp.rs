//! Partial-precision HL7 timestamps.
//!
//! A CDA `effectiveTime` value such as `2020`, `202003` or
//! `20200315143000-0500` carries only the components the author knew.
//! [`PartialTimestamp`] keeps exactly those components and records the
//! precision they reach, so a year-only value never reports a month or day.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::InvalidTimestamp;

/// Finest component present in a [`PartialTimestamp`].
///
/// Ordered from coarsest to finest, so `Precision::Day < Precision::Second`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// `YYYY`
    Year,
    /// `YYYYMM`
    Month,
    /// `YYYYMMDD`
    Day,
    /// `YYYYMMDDHH`
    Hour,
    /// `YYYYMMDDHHMM`
    Minute,
    /// `YYYYMMDDHHMMSS`
    Second,
    /// `YYYYMMDDHHMMSS.F+`
    #[serde(rename = "fractional_second")]
    FractionalSecond,
}

impl Precision {
    /// The precision reached by adding one more fixed-width digit group.
    ///
    /// Returns `None` from `Second` onwards; fractional seconds are not a
    /// fixed-width group.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Year => Some(Self::Month),
            Self::Month => Some(Self::Day),
            Self::Day => Some(Self::Hour),
            Self::Hour => Some(Self::Minute),
            Self::Minute => Some(Self::Second),
            Self::Second | Self::FractionalSecond => None,
        }
    }

    pub fn has_complete_date(self) -> bool {
        self >= Self::Day
    }

    pub fn has_time(self) -> bool {
        self >= Self::Hour
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Second => "second",
            Self::FractionalSecond => "fractional_second",
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A timestamp whose components are present only up to its precision.
///
/// Values are built from the year outwards with [`PartialTimestamp::extend`],
/// which is the only way to add a component. That keeps the invariant that
/// `month` is present iff precision is at least `Month`, and so on.
/// Deserialization replays the same steps and rejects values that break it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPartialTimestamp")]
pub struct PartialTimestamp {
    year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hour: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    minute: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    second: Option<u32>,
    /// Fractional-second digits exactly as written (`"1234"` for `.1234`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fraction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    offset_minutes: Option<i32>,
    precision: Precision,
}

impl PartialTimestamp {
    /// A year-precision timestamp.
    pub fn new(year: i32) -> Self {
        Self {
            year,
            month: None,
            day: None,
            hour: None,
            minute: None,
            second: None,
            fraction: None,
            offset_minutes: None,
            precision: Precision::Year,
        }
    }

    /// Adds the next fixed-width component (month after year, day after
    /// month, ...). Returns `None` when the timestamp is already at second
    /// precision or finer.
    #[must_use]
    pub fn extend(mut self, value: u32) -> Option<Self> {
        let next = self.precision.next()?;
        match next {
            Precision::Month => self.month = Some(value),
            Precision::Day => self.day = Some(value),
            Precision::Hour => self.hour = Some(value),
            Precision::Minute => self.minute = Some(value),
            Precision::Second => self.second = Some(value),
            Precision::Year | Precision::FractionalSecond => return None,
        }
        self.precision = next;
        Some(self)
    }

    /// Whether `value` is in range for the component [`extend`](Self::extend)
    /// would add next. Day validity depends on the year and month.
    pub fn accepts_next(&self, value: u32) -> bool {
        match self.precision.next() {
            Some(Precision::Month) => (1..=12).contains(&value),
            Some(Precision::Day) => self
                .month
                .and_then(|month| NaiveDate::from_ymd_opt(self.year, month, value))
                .is_some(),
            Some(Precision::Hour) => value <= 23,
            Some(Precision::Minute) => value <= 59,
            // 60 admits a leap second.
            Some(Precision::Second) => value <= 60,
            Some(Precision::Year | Precision::FractionalSecond) | None => false,
        }
    }

    /// Adds fractional-second digits. Only valid at second precision.
    #[must_use]
    pub fn with_fraction(mut self, digits: impl Into<String>) -> Option<Self> {
        if self.precision != Precision::Second {
            return None;
        }
        self.fraction = Some(digits.into());
        self.precision = Precision::FractionalSecond;
        Some(self)
    }

    /// Attaches a UTC offset in minutes (e.g. `-300` for `-0500`).
    #[must_use]
    pub fn with_offset_minutes(mut self, offset: i32) -> Self {
        self.offset_minutes = Some(offset);
        self
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }

    pub fn day(&self) -> Option<u32> {
        self.day
    }

    pub fn hour(&self) -> Option<u32> {
        self.hour
    }

    pub fn minute(&self) -> Option<u32> {
        self.minute
    }

    pub fn second(&self) -> Option<u32> {
        self.second
    }

    pub fn fraction(&self) -> Option<&str> {
        self.fraction.as_deref()
    }

    pub fn offset_minutes(&self) -> Option<i32> {
        self.offset_minutes
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// The calendar date, when the day is known.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month?, self.day?)
    }

    /// The local date and time, when known to the second.
    ///
    /// A leap second (`60`) is mapped onto chrono's leap-second
    /// representation of `59` plus one second of nanoseconds.
    pub fn to_naive_datetime(&self) -> Option<NaiveDateTime> {
        let date = self.to_naive_date()?;
        let second = self.second?;
        let mut nanos = self.fraction_nanos();
        let second = if second == 60 {
            nanos += 1_000_000_000;
            59
        } else {
            second
        };
        let time = NaiveTime::from_hms_nano_opt(self.hour?, self.minute?, second, nanos)?;
        Some(NaiveDateTime::new(date, time))
    }

    /// The instant, when known to the second and the offset is declared.
    pub fn to_fixed_datetime(&self) -> Option<DateTime<FixedOffset>> {
        let offset = FixedOffset::east_opt(self.offset_minutes? * 60)?;
        self.to_naive_datetime()?
            .and_local_timezone(offset)
            .single()
    }

    fn fraction_nanos(&self) -> u32 {
        let Some(digits) = self.fraction.as_deref() else {
            return 0;
        };
        let mut nanos = 0u32;
        for position in 0..9 {
            let digit = digits
                .chars()
                .nth(position)
                .and_then(|ch| ch.to_digit(10))
                .unwrap_or(0);
            nanos = nanos * 10 + digit;
        }
        nanos
    }
}

/// Unchecked serialized form of [`PartialTimestamp`].
#[derive(Deserialize)]
struct RawPartialTimestamp {
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
    hour: Option<u32>,
    minute: Option<u32>,
    second: Option<u32>,
    fraction: Option<String>,
    offset_minutes: Option<i32>,
    precision: Precision,
}

/// Largest offset magnitude in minutes (`+2359`).
const MAX_OFFSET_MINUTES: u32 = 23 * 60 + 59;

impl TryFrom<RawPartialTimestamp> for PartialTimestamp {
    type Error = InvalidTimestamp;

    fn try_from(raw: RawPartialTimestamp) -> Result<Self, Self::Error> {
        let components = [
            (Precision::Month, raw.month),
            (Precision::Day, raw.day),
            (Precision::Hour, raw.hour),
            (Precision::Minute, raw.minute),
            (Precision::Second, raw.second),
        ];
        let mut timestamp = Self::new(raw.year);
        for (component, value) in components {
            match (raw.precision >= component, value) {
                (true, Some(value)) => {
                    if !timestamp.accepts_next(value) {
                        return Err(InvalidTimestamp::new(format!(
                            "{component} {value} out of range"
                        )));
                    }
                    timestamp = timestamp.extend(value).ok_or_else(|| {
                        InvalidTimestamp::new(format!("{component} cannot follow the year"))
                    })?;
                }
                (true, None) => {
                    return Err(InvalidTimestamp::new(format!(
                        "{} precision requires {component}",
                        raw.precision
                    )));
                }
                (false, Some(_)) => {
                    return Err(InvalidTimestamp::new(format!(
                        "{component} present at {} precision",
                        raw.precision
                    )));
                }
                (false, None) => {}
            }
        }

        match (raw.precision == Precision::FractionalSecond, raw.fraction) {
            (true, Some(digits)) => {
                if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
                    return Err(InvalidTimestamp::new("fraction must be digits"));
                }
                timestamp = timestamp.with_fraction(digits).ok_or_else(|| {
                    InvalidTimestamp::new("fraction requires a seconds component")
                })?;
            }
            (true, None) => {
                return Err(InvalidTimestamp::new(
                    "fractional_second precision requires fraction",
                ));
            }
            (false, Some(_)) => {
                return Err(InvalidTimestamp::new(format!(
                    "fraction present at {} precision",
                    raw.precision
                )));
            }
            (false, None) => {}
        }

        if let Some(offset) = raw.offset_minutes {
            if offset.unsigned_abs() > MAX_OFFSET_MINUTES {
                return Err(InvalidTimestamp::new(format!(
                    "offset {offset} minutes out of range"
                )));
            }
            timestamp = timestamp.with_offset_minutes(offset);
        }
        Ok(timestamp)
    }
}

impl fmt::Display for PartialTimestamp {
    /// Renders the compact HL7 form at the value's own precision.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.year)?;
        for component in [self.month, self.day, self.hour, self.minute, self.second]
            .into_iter()
            .flatten()
        {
            write!(f, "{component:02}")?;
        }
        if let Some(fraction) = &self.fraction {
            write!(f, ".{fraction}")?;
        }
        if let Some(offset) = self.offset_minutes {
            let sign = if offset < 0 { '-' } else { '+' };
            let magnitude = offset.unsigned_abs();
            write!(f, "{sign}{:02}{:02}", magnitude / 60, magnitude % 60)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extend_walks_precision_in_order() {
        let ts = PartialTimestamp::new(2020).extend(3).unwrap();
        assert_eq!(ts.precision(), Precision::Month);
        assert_eq!(ts.month(), Some(3));
        assert_eq!(ts.day(), None);
    }

    #[test]
    fn extend_stops_at_second() {
        let mut ts = PartialTimestamp::new(2020);
        for value in [1, 2, 3, 4, 5] {
            ts = ts.extend(value).unwrap();
        }
        assert_eq!(ts.precision(), Precision::Second);
        assert!(ts.clone().extend(6).is_none());
        assert!(ts.with_fraction("5").is_some());
    }

    #[test]
    fn fraction_requires_second_precision() {
        assert!(PartialTimestamp::new(2020).with_fraction("1").is_none());
    }

    #[test]
    fn year_only_has_no_calendar_date() {
        let ts = PartialTimestamp::new(2021);
        assert_eq!(ts.to_naive_date(), None);
        assert_eq!(ts.to_naive_datetime(), None);
    }

    #[test]
    fn display_preserves_precision_and_offset() {
        let ts = PartialTimestamp::new(2020)
            .extend(3)
            .and_then(|ts| ts.extend(15))
            .unwrap()
            .with_offset_minutes(-330);
        assert_eq!(ts.to_string(), "20200315-0530");
    }

    #[test]
    fn fraction_converts_to_nanoseconds() {
        let mut ts = PartialTimestamp::new(2020);
        for value in [3, 15, 14, 30, 0] {
            ts = ts.extend(value).unwrap();
        }
        let ts = ts.with_fraction("25").unwrap();
        let datetime = ts.to_naive_datetime().unwrap();
        assert_eq!(datetime.and_utc().timestamp_subsec_millis(), 250);
    }

    #[test]
    fn accepts_next_checks_calendar() {
        let february = PartialTimestamp::new(2021).extend(2).unwrap();
        assert!(february.accepts_next(28));
        assert!(!february.accepts_next(29));
        assert!(PartialTimestamp::new(2020).extend(2).unwrap().accepts_next(29));
        assert!(!PartialTimestamp::new(2020).accepts_next(0));
    }

    #[test]
    fn precision_ordering() {
        assert!(Precision::Year < Precision::Month);
        assert!(Precision::Day.has_complete_date());
        assert!(!Precision::Day.has_time());
        assert!(Precision::Hour.has_time());
    }
}
