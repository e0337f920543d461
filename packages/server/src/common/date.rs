//! Calendar value objects for the dispatch site's date formats.
//!
//! The site speaks `YYYYMMDD` everywhere (search forms, stored records,
//! migration ranges) with no timezone component, so dates are plain local
//! calendar dates. Day counting and iteration are exact calendar arithmetic;
//! the inclusive-range contract of the migration runner depends on it.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Local, NaiveDate, Timelike, Weekday};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::DomainError;

/// A calendar date in the site's `YYYYMMDD` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SearchDate(NaiveDate);

impl SearchDate {
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let trimmed = input.trim();
        if trimmed.len() != 8 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::Validation(
                "date must be YYYYMMDD (8 digits)".to_string(),
            ));
        }
        NaiveDate::parse_from_str(trimmed, "%Y%m%d")
            .map(Self)
            .map_err(|_| DomainError::Validation(format!("not a calendar date: {trimmed}")))
    }

    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn yesterday() -> Self {
        Self(Local::now().date_naive() - Duration::days(1))
    }

    /// The date the dispatch site is expected to have data for right now.
    /// Before 14:00 the site still shows the previous business day
    /// (Monday falls back to Friday, Sunday to Friday).
    pub fn default_for_crawling() -> Self {
        let now = Local::now();
        let mut date = now.date_naive();
        if now.hour() < 14 {
            date -= match date.weekday() {
                Weekday::Mon => Duration::days(3),
                Weekday::Sun => Duration::days(2),
                _ => Duration::days(1),
            };
        }
        Self(date)
    }

    /// Number of calendar days in `[self, end]`, inclusive. Zero or negative
    /// when `end` precedes `self`.
    pub fn days_until(&self, end: SearchDate) -> i64 {
        (end.0 - self.0).num_days() + 1
    }

    /// Ascending iteration over every calendar day in `[self, end]`.
    pub fn iter_through(&self, end: SearchDate) -> impl Iterator<Item = SearchDate> {
        let mut next = Some(self.0);
        let last = end.0;
        std::iter::from_fn(move || {
            let day = next?;
            if day > last {
                return None;
            }
            next = day.succ_opt();
            Some(SearchDate(day))
        })
    }

    /// `YYYY-MM-DD` form for human-facing messages.
    pub fn formatted(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for SearchDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y%m%d"))
    }
}

impl FromStr for SearchDate {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for SearchDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SearchDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(D::Error::custom)
    }
}

/// A `YYYYMM` month, used by the monthly stats queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let trimmed = input.trim();
        if trimmed.len() != 6 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::Validation(
                "month must be YYYYMM (6 digits)".to_string(),
            ));
        }
        let year: i32 = trimmed[..4].parse().expect("digits checked above");
        let month: u32 = trimmed[4..].parse().expect("digits checked above");
        if !(2000..=2100).contains(&year) {
            return Err(DomainError::Validation(
                "year must be between 2000 and 2100".to_string(),
            ));
        }
        if !(1..=12).contains(&month) {
            return Err(DomainError::Validation(
                "month must be between 01 and 12".to_string(),
            ));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> SearchDate {
        SearchDate::parse(s).unwrap()
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(SearchDate::parse("2026-01-01").is_err());
        assert!(SearchDate::parse("202601").is_err());
        assert!(SearchDate::parse("abcdefgh").is_err());
        assert!(SearchDate::parse("20261301").is_err()); // month 13
        assert!(SearchDate::parse("20260230").is_err()); // Feb 30
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(d(" 20260101 ").to_string(), "20260101");
    }

    #[test]
    fn test_inclusive_day_counts() {
        assert_eq!(d("20260101").days_until(d("20260101")), 1);
        assert_eq!(d("20260101").days_until(d("20260103")), 3);
        // Month boundary
        assert_eq!(d("20260131").days_until(d("20260201")), 2);
        // Leap year: 2024-02-28 .. 2024-03-01 spans the 29th
        assert_eq!(d("20240228").days_until(d("20240301")), 3);
        // Reversed range is not a range
        assert!(d("20260102").days_until(d("20260101")) < 1);
    }

    #[test]
    fn test_iter_through_crosses_month_boundary() {
        let days: Vec<String> = d("20260130")
            .iter_through(d("20260202"))
            .map(|day| day.to_string())
            .collect();
        assert_eq!(days, vec!["20260130", "20260131", "20260201", "20260202"]);
    }

    #[test]
    fn test_iter_through_empty_when_reversed() {
        assert_eq!(d("20260102").iter_through(d("20260101")).count(), 0);
    }

    #[test]
    fn test_formatted() {
        assert_eq!(d("20260131").formatted(), "2026-01-31");
    }

    #[test]
    fn test_year_month_validation() {
        assert!(YearMonth::parse("202601").is_ok());
        assert!(YearMonth::parse("202613").is_err());
        assert!(YearMonth::parse("199901").is_err());
        assert!(YearMonth::parse("20260").is_err());
        assert_eq!(YearMonth::parse("202602").unwrap().to_string(), "202602");
    }
}
