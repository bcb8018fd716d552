//! Pay period model.
//!
//! This module contains the [`PayPeriod`] and [`PayHalf`] types. A pay period is
//! one of the two fixed "quincenas" of a payroll month: half A runs from the
//! 27th of the previous month to the 11th, half B from the 12th to the 26th.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Which half of the payroll month a period covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayHalf {
    /// Day 27 of the previous month through day 11.
    A,
    /// Day 12 through day 26 of the same month.
    B,
}

impl PayHalf {
    /// The single-letter suffix used in period codes.
    pub fn letter(self) -> char {
        match self {
            PayHalf::A => 'A',
            PayHalf::B => 'B',
        }
    }
}

impl fmt::Display for PayHalf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// A resolved pay period.
///
/// Periods are produced by [`crate::calculation::resolve_period`]; the code is
/// always derived from the payroll `(year, month, half)`, and the payroll month
/// is the month of `end_date`.
///
/// # Example
///
/// ```
/// use quincena_payroll::models::{PayHalf, PayPeriod};
/// use chrono::NaiveDate;
///
/// let period = PayPeriod {
///     start_date: NaiveDate::from_ymd_opt(2024, 3, 12).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2024, 3, 26).unwrap(),
///     code: "202403B".to_string(),
///     half: PayHalf::B,
/// };
///
/// assert!(period.contains_date(NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()));
/// assert_eq!(period.len_days(), 15);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayPeriod {
    /// The first day of the period (inclusive).
    pub start_date: NaiveDate,
    /// The last day of the period (inclusive).
    pub end_date: NaiveDate,
    /// The period code, `YYYYMMH`.
    pub code: String,
    /// Which half of the month this period covers.
    pub half: PayHalf,
}

impl PayPeriod {
    /// The payroll year (the year of the end date).
    pub fn year(&self) -> i32 {
        self.end_date.year()
    }

    /// The payroll month (the month of the end date).
    pub fn month(&self) -> u32 {
        self.end_date.month()
    }

    /// Number of calendar days in the period, both ends inclusive.
    pub fn len_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Checks if a date falls within the period (inclusive on both ends).
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Checks whether the inclusive range `start..=end` intersects this period.
    ///
    /// ```
    /// use quincena_payroll::models::{PayHalf, PayPeriod};
    /// use chrono::NaiveDate;
    ///
    /// let period = PayPeriod {
    ///     start_date: NaiveDate::from_ymd_opt(2024, 3, 12).unwrap(),
    ///     end_date: NaiveDate::from_ymd_opt(2024, 3, 26).unwrap(),
    ///     code: "202403B".to_string(),
    ///     half: PayHalf::B,
    /// };
    /// let d = |m, d| NaiveDate::from_ymd_opt(2024, m, d).unwrap();
    ///
    /// assert!(period.overlaps(d(3, 20), d(4, 3)));
    /// assert!(period.overlaps(d(3, 26), d(3, 26)));
    /// assert!(!period.overlaps(d(3, 27), d(4, 11)));
    /// ```
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && start <= self.end_date
    }

    /// Iterates over every date of the period in order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start_date
            .iter_days()
            .take_while(move |d| *d <= self.end_date)
    }
}

impl fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}..{})", self.code, self.start_date, self.end_date)
    }
}
