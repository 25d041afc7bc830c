//! Timestamps and time intervals in the HL7 `TS` wire form.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ModelError, Result};

/// How many digits of a timestamp are significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimestampPrecision {
    /// `YYYYMMDD`
    Day,
    /// `YYYYMMDDHHmmss`
    Second,
    /// `YYYYMMDDHHmmss.SSS`
    Millisecond,
}

/// A point in time rendered as a fixed-width digit string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timestamp {
    value: NaiveDateTime,
    precision: TimestampPrecision,
}

impl Timestamp {
    /// Wrap a date-time; sub-second parts select millisecond precision.
    ///
    /// Anything finer than a millisecond is truncated.
    pub fn new(value: NaiveDateTime) -> Self {
        let precision = if value.nanosecond() == 0 {
            TimestampPrecision::Second
        } else {
            TimestampPrecision::Millisecond
        };
        Self::with_precision(value, precision)
    }

    /// Wrap a date-time, truncating it to the digits `precision` renders.
    pub fn with_precision(value: NaiveDateTime, precision: TimestampPrecision) -> Self {
        let value = match precision {
            TimestampPrecision::Day => value.date().and_time(chrono::NaiveTime::MIN),
            TimestampPrecision::Second => value.with_nanosecond(0).unwrap_or(value),
            TimestampPrecision::Millisecond => {
                let nanos = value.nanosecond();
                value
                    .with_nanosecond(nanos - nanos % 1_000_000)
                    .unwrap_or(value)
            }
        };
        Self { value, precision }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            value: date.and_time(chrono::NaiveTime::MIN),
            precision: TimestampPrecision::Day,
        }
    }

    /// Parse `YYYYMMDD`, `YYYYMMDDHHmmss` or `YYYYMMDDHHmmss.SSS`.
    ///
    /// Fractions of one or two digits are accepted and read as milliseconds;
    /// finer fractions are rejected since they cannot be written back.
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let invalid = || ModelError::InvalidTimestamp {
            value: value.to_string(),
        };
        if !trimmed.is_ascii() {
            return Err(invalid());
        }
        let (digits, fraction) = match trimmed.split_once('.') {
            Some((digits, fraction)) => (digits, Some(fraction)),
            None => (trimmed, None),
        };
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        match (digits.len(), fraction) {
            (8, None) => NaiveDate::parse_from_str(digits, "%Y%m%d")
                .map(Self::from_date)
                .map_err(|_| invalid()),
            (14, None) => NaiveDateTime::parse_from_str(digits, "%Y%m%d%H%M%S")
                .map(|value| Self::with_precision(value, TimestampPrecision::Second))
                .map_err(|_| invalid()),
            (14, Some(fraction))
                if !fraction.is_empty()
                    && fraction.len() <= 3
                    && fraction.bytes().all(|b| b.is_ascii_digit()) =>
            {
                NaiveDateTime::parse_from_str(trimmed, "%Y%m%d%H%M%S%.f")
                    .map(|value| Self::with_precision(value, TimestampPrecision::Millisecond))
                    .map_err(|_| invalid())
            }
            _ => Err(invalid()),
        }
    }

    pub fn value(&self) -> NaiveDateTime {
        self.value
    }

    pub fn precision(&self) -> TimestampPrecision {
        self.precision
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pattern = match self.precision {
            TimestampPrecision::Day => "%Y%m%d",
            TimestampPrecision::Second => "%Y%m%d%H%M%S",
            TimestampPrecision::Millisecond => "%Y%m%d%H%M%S%.3f",
        };
        write!(f, "{}", self.value.format(pattern))
    }
}

impl std::str::FromStr for Timestamp {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// One end of a [`TimeInterval`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBound {
    pub value: Timestamp,
    /// Explicit inclusive/exclusive flag; `None` leaves it unstated.
    pub inclusive: Option<bool>,
}

impl TimeBound {
    pub fn new(value: Timestamp) -> Self {
        Self {
            value,
            inclusive: None,
        }
    }
}

/// A `low`/`high` effective-time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeInterval {
    pub low: Option<TimeBound>,
    pub high: Option<TimeBound>,
}

impl TimeInterval {
    pub fn between(low: Timestamp, high: Timestamp) -> Self {
        Self {
            low: Some(TimeBound::new(low)),
            high: Some(TimeBound::new(high)),
        }
    }

    /// Set the boundary flags on whichever bounds are present.
    #[must_use]
    pub fn with_inclusive(mut self, low: Option<bool>, high: Option<bool>) -> Self {
        if let Some(bound) = self.low.as_mut() {
            bound.inclusive = low;
        }
        if let Some(bound) = self.high.as_mut() {
            bound.inclusive = high;
        }
        self
    }

    /// True when both bounds are present and `low` is later than `high`.
    pub fn is_inverted(&self) -> bool {
        match (self.low, self.high) {
            (Some(low), Some(high)) => low.value.value() > high.value.value(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_precision() {
        let day = Timestamp::parse("19700101").unwrap();
        assert_eq!(day.precision(), TimestampPrecision::Day);
        assert_eq!(day.to_string(), "19700101");

        let second = Timestamp::parse("20021122091000").unwrap();
        assert_eq!(second.precision(), TimestampPrecision::Second);
        assert_eq!(second.to_string(), "20021122091000");

        let milli = Timestamp::parse("20021122091000.250").unwrap();
        assert_eq!(milli.precision(), TimestampPrecision::Millisecond);
        assert_eq!(milli.to_string(), "20021122091000.250");
    }

    #[test]
    fn short_fractions_render_as_milliseconds() {
        let ts = Timestamp::parse("20021122091000.5").unwrap();
        assert_eq!(ts.to_string(), "20021122091000.500");
        assert_eq!(Timestamp::parse(&ts.to_string()).unwrap(), ts);
    }

    #[test]
    fn rejects_malformed_values() {
        for bad in [
            "",
            "2002",
            "2002112209",
            "20021322091000",
            "20021122091000.",
            "2002-11-22",
            "20021122091000.1234",
        ] {
            assert!(Timestamp::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn new_picks_precision_from_subseconds() {
        let value = NaiveDate::from_ymd_opt(2002, 11, 22)
            .unwrap()
            .and_hms_milli_opt(9, 10, 0, 0)
            .unwrap();
        assert_eq!(Timestamp::new(value).precision(), TimestampPrecision::Second);
        let value = value.with_nanosecond(2_000_000).unwrap();
        assert_eq!(Timestamp::new(value).to_string(), "20021122091000.002");
    }

    #[test]
    fn values_are_truncated_to_their_rendered_precision() {
        let value = NaiveDate::from_ymd_opt(2002, 11, 22)
            .unwrap()
            .and_hms_nano_opt(9, 10, 0, 123_456_789)
            .unwrap();
        let milli = Timestamp::new(value);
        assert_eq!(milli.value().nanosecond(), 123_000_000);
        assert_eq!(Timestamp::parse(&milli.to_string()).unwrap(), milli);

        let second = Timestamp::with_precision(value, TimestampPrecision::Second);
        assert_eq!(second.value().nanosecond(), 0);
        assert_eq!(Timestamp::parse(&second.to_string()).unwrap(), second);

        let day = Timestamp::with_precision(value, TimestampPrecision::Day);
        assert_eq!(Timestamp::parse(&day.to_string()).unwrap(), day);
    }

    #[test]
    fn inverted_interval_detection() {
        let early = Timestamp::parse("20021122091000").unwrap();
        let late = Timestamp::parse("20021122091010").unwrap();
        assert!(!TimeInterval::between(early, late).is_inverted());
        assert!(TimeInterval::between(late, early).is_inverted());
        assert!(!TimeInterval::default().is_inverted());
    }

    #[test]
    fn inclusive_flags_apply_to_present_bounds() {
        let ts = Timestamp::parse("20021122091000").unwrap();
        let interval = TimeInterval {
            low: Some(TimeBound::new(ts)),
            high: None,
        }
        .with_inclusive(Some(true), Some(false));
        assert_eq!(interval.low.unwrap().inclusive, Some(true));
        assert!(interval.high.is_none());
    }
}
