//! Payroll period model.
//!
//! A [`PayPeriod`] is one calendar month. Construction validates the month
//! and year and fixes the real calendar length, so every downstream
//! calculation can rely on `days_in_month` being correct for leap years.

use std::fmt;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Earliest year accepted for a payroll period.
pub const MIN_YEAR: i32 = 1900;

/// Latest year accepted for a payroll period.
pub const MAX_YEAR: i32 = 9998;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PeriodParts {
    month: u32,
    year: i32,
}

/// A calendar month for which attendance is summarized and payroll is run.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayPeriod;
///
/// let february = PayPeriod::new(2, 2024).unwrap();
/// assert_eq!(february.days_in_month(), 29);
/// assert_eq!(february.to_string(), "2024-02");
///
/// assert!(PayPeriod::new(13, 2024).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "PeriodParts", into = "PeriodParts")]
pub struct PayPeriod {
    year: i32,
    month: u32,
    first_day: NaiveDate,
    days: u32,
}

impl PayPeriod {
    /// Creates a period for `month` (1-12) of `year`.
    pub fn new(month: u32, year: i32) -> EngineResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::validation(
                "month",
                format!("{} is not between 1 and 12", month),
            ));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(EngineError::validation(
                "year",
                format!("{} is not between {} and {}", year, MIN_YEAR, MAX_YEAR),
            ));
        }

        let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            EngineError::validation("period", format!("{}-{:02} is not a date", year, month))
        })?;
        let next_first = first_day
            .checked_add_months(Months::new(1))
            .ok_or_else(|| {
                EngineError::validation("period", format!("{}-{:02} is out of range", year, month))
            })?;
        let days = (next_first - first_day).num_days() as u32;

        Ok(Self {
            year,
            month,
            first_day,
            days,
        })
    }

    /// The month number, 1-12.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Actual calendar length of the month, including leap-year February.
    pub fn days_in_month(&self) -> u32 {
        self.days
    }

    /// The first day of the period.
    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// The last day of the period (inclusive).
    pub fn last_day(&self) -> NaiveDate {
        self.first_day + chrono::Duration::days(i64::from(self.days) - 1)
    }

    /// Checks if a given date falls within this period (inclusive).
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day && date <= self.last_day()
    }

    /// Iterates every calendar day of the period in order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let first_day = self.first_day;
        (0..i64::from(self.days)).map(move |offset| first_day + chrono::Duration::days(offset))
    }
}

impl fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

impl TryFrom<PeriodParts> for PayPeriod {
    type Error = EngineError;

    fn try_from(parts: PeriodParts) -> EngineResult<Self> {
        PayPeriod::new(parts.month, parts.year)
    }
}

impl From<PayPeriod> for PeriodParts {
    fn from(period: PayPeriod) -> Self {
        PeriodParts {
            month: period.month,
            year: period.year,
        }
    }
}
