//! Parsing of the two dataset date shapes: `YYYY-MM-DD` and `MM-DD`.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use crate::error::{DitaError, DitaResult};

/// Leap year used to validate annual dates, so `02-29` is accepted.
const LEAP_YEAR: i32 = 2000;

/// The `MM-DD` component of a date, the matching key for every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    pub fn new(month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(LEAP_YEAR, month, day)?;
        Some(MonthDay { month, day })
    }

    /// Month-day of a calendar date.
    pub fn of<D: Datelike>(date: &D) -> Self {
        MonthDay {
            month: date.month(),
            day: date.day(),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

impl FromStr for MonthDay {
    type Err = DitaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || DitaError::MalformedDate(s.to_string());

        if s.len() != 5 || !has_shape(s, &[2]) {
            return Err(malformed());
        }
        let month = s[0..2].parse().map_err(|_| malformed())?;
        let day = s[3..5].parse().map_err(|_| malformed())?;

        MonthDay::new(month, day).ok_or_else(malformed)
    }
}

/// Date field of a dataset record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDate {
    /// `YYYY-MM-DD`: a dated occurrence with a specific year.
    Full(NaiveDate),
    /// `MM-DD`: recurs every year.
    Annual(MonthDay),
}

impl EventDate {
    /// Parse a record's date field. The string length decides the shape.
    pub fn parse(s: &str) -> DitaResult<Self> {
        match s.len() {
            10 => {
                if !has_shape(s, &[4, 7]) {
                    return Err(DitaError::MalformedDate(s.to_string()));
                }
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map(EventDate::Full)
                    .map_err(|_| DitaError::MalformedDate(s.to_string()))
            }
            5 => s.parse().map(EventDate::Annual),
            _ => Err(DitaError::MalformedDate(s.to_string())),
        }
    }

    pub fn month_day(&self) -> MonthDay {
        match self {
            EventDate::Full(date) => MonthDay::of(date),
            EventDate::Annual(md) => *md,
        }
    }

    pub fn is_dated(&self) -> bool {
        matches!(self, EventDate::Full(_))
    }
}

/// ASCII digits everywhere except `-` at the given byte offsets.
fn has_shape(s: &str, dashes: &[usize]) -> bool {
    s.bytes().enumerate().all(|(i, b)| {
        if dashes.contains(&i) {
            b == b'-'
        } else {
            b.is_ascii_digit()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_date() {
        let parsed = EventDate::parse("2008-02-17").unwrap();
        assert_eq!(
            parsed,
            EventDate::Full(NaiveDate::from_ymd_opt(2008, 2, 17).unwrap())
        );
        assert!(parsed.is_dated());
        assert_eq!(parsed.month_day().to_string(), "02-17");
    }

    #[test]
    fn test_parse_annual_date() {
        let parsed = EventDate::parse("11-28").unwrap();
        assert_eq!(parsed, EventDate::Annual(MonthDay::new(11, 28).unwrap()));
        assert!(!parsed.is_dated());
    }

    #[test]
    fn test_leap_day_is_a_valid_annual_date() {
        assert!(EventDate::parse("02-29").is_ok());
        assert!(EventDate::parse("02-30").is_err());
    }

    #[test]
    fn test_malformed_dates_are_rejected() {
        for bad in [
            "", "2008-2-17", "2008/02/17", "13-01", "00-10", "1-1", "abcd-ef-gh", "+008-02-17",
            "2023-02-29", "02-17 ",
        ] {
            assert!(
                matches!(EventDate::parse(bad), Err(DitaError::MalformedDate(_))),
                "expected '{bad}' to be malformed"
            );
        }
    }

    #[test]
    fn test_month_day_of_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(MonthDay::of(&date), MonthDay::new(3, 7).unwrap());
        assert_eq!(MonthDay::of(&date).to_string(), "03-07");
    }
}
