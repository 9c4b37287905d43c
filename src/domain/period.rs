//! Monthly reporting periods encoded as `YYYYMM` integers.

use chrono::{Datelike, Months, NaiveDate};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

const MONTH_ABBREV: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Latest year a period may carry.
pub const MAX_YEAR: i32 = 9999;

/// A reporting period such as `202401` (January 2024).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "i32")]
pub struct ReportPeriod(i32);

impl ReportPeriod {
    /// Validates a raw `YYYYMM` value with a year in `1..=9999`.
    pub fn new(raw: i32) -> Option<Self> {
        let month = raw % 100;
        let year = raw / 100;
        if (1..=12).contains(&month) && (1..=MAX_YEAR).contains(&year) {
            Some(Self(raw))
        } else {
            None
        }
    }

    pub fn from_ym(year: i32, month: u32) -> Option<Self> {
        Self::new(year * 100 + month as i32)
    }

    pub fn raw(self) -> i32 {
        self.0
    }

    pub fn year(self) -> i32 {
        self.0 / 100
    }

    pub fn month(self) -> u32 {
        (self.0 % 100) as u32
    }

    /// First calendar day of the period.
    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year(), self.month(), 1)
    }

    /// The period `months` earlier; `None` if that falls before year 1.
    pub fn minus_months(self, months: u32) -> Option<Self> {
        let date = self.first_day()?.checked_sub_months(Months::new(months))?;
        Self::from_ym(date.year(), date.month())
    }

    /// The period `months` later; `None` past [`MAX_YEAR`].
    pub fn plus_months(self, months: u32) -> Option<Self> {
        let date = self.first_day()?.checked_add_months(Months::new(months))?;
        Self::from_ym(date.year(), date.month())
    }

    /// Human-readable label, e.g. `Jan 2024`.
    pub fn label(self) -> String {
        format!("{} {}", MONTH_ABBREV[(self.month() - 1) as usize], self.year())
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid reporting period '{0}' (expected YYYYMM)")]
pub struct PeriodParseError(pub String);

impl TryFrom<i32> for ReportPeriod {
    type Error = PeriodParseError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or_else(|| PeriodParseError(raw.to_string()))
    }
}

impl FromStr for ReportPeriod {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() != 6 {
            return Err(PeriodParseError(s.to_string()));
        }
        trimmed
            .parse::<i32>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| PeriodParseError(s.to_string()))
    }
}
