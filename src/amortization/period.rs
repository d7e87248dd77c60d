//! Calendar year-month used to date schedule periods

use chrono::{Datelike, Local, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::AmortizationError;

/// A calendar month, stored as the first day of that month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    /// Build from a year and a 1-based month; `None` if the month is out of range
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(YearMonth)
    }

    /// The month containing today's local date
    pub fn current() -> Self {
        let today = Local::now().date_naive();
        // Day 1 of a month that already exists is always valid
        YearMonth(today.with_day(1).unwrap_or(today))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Month of the year (1-12)
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Advance by whole months, rolling the year over as needed.
    /// Saturates at chrono's maximum date.
    pub fn plus_months(&self, months: u32) -> Self {
        self.0
            .checked_add_months(Months::new(months))
            .map(YearMonth)
            .unwrap_or(*self)
    }

    /// Long display form, e.g. "January 2015"
    pub fn long_name(&self) -> String {
        self.0.format("%B %Y").to_string()
    }

    /// Short display form, e.g. "Jan 2015"
    pub fn short_name(&self) -> String {
        self.0.format("%b %Y").to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

impl FromStr for YearMonth {
    type Err = AmortizationError;

    /// Parse `YYYY-MM` (a trailing `-DD` is accepted and ignored)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut parts = trimmed.splitn(3, '-');
        let year = parts.next().and_then(|y| y.parse::<i32>().ok());
        let month = parts.next().and_then(|m| m.parse::<u32>().ok());

        match (year, month) {
            (Some(y), Some(m)) => {
                YearMonth::new(y, m).ok_or_else(|| AmortizationError::InvalidPeriod(s.to_string()))
            }
            _ => Err(AmortizationError::InvalidPeriod(s.to_string())),
        }
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let ym: YearMonth = "2015-01".parse().unwrap();
        assert_eq!(ym.year(), 2015);
        assert_eq!(ym.month(), 1);
        assert_eq!(ym.to_string(), "2015-01");
        assert_eq!(ym.long_name(), "January 2015");
        assert_eq!(ym.short_name(), "Jan 2015");

        let with_day: YearMonth = "2020-07-15".parse().unwrap();
        assert_eq!(with_day.to_string(), "2020-07");
    }

    #[test]
    fn test_invalid_periods() {
        assert!("2015-13".parse::<YearMonth>().is_err());
        assert!("2015".parse::<YearMonth>().is_err());
        assert!("Jan 2015".parse::<YearMonth>().is_err());
        assert!(YearMonth::new(2015, 0).is_none());
    }

    #[test]
    fn test_month_rollover() {
        let start = YearMonth::new(2015, 11).unwrap();
        assert_eq!(start.plus_months(0), start);
        assert_eq!(start.plus_months(1).to_string(), "2015-12");
        assert_eq!(start.plus_months(2).to_string(), "2016-01");
        assert_eq!(start.plus_months(119).to_string(), "2025-10");
    }

    #[test]
    fn test_serde_round_trip() {
        let ym = YearMonth::new(2024, 3).unwrap();
        let json = serde_json::to_string(&ym).unwrap();
        assert_eq!(json, "\"2024-03\"");
        let back: YearMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ym);
    }
}
