//! Pay period resolution.
//!
//! A payroll month has two fixed halves ("quincenas"):
//!
//! - **Half A** runs from day 27 of the *previous* month through day 11.
//!   January's half A therefore starts on December 27 of the prior year.
//! - **Half B** runs from day 12 through day 26 of the month.
//!
//! Days 27 to the end of a month belong to half A of the *following* payroll
//! month. Period codes have the form `YYYYMMH`.

use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use crate::error::{EngineError, EngineResult};
use crate::models::{PayHalf, PayPeriod, PeriodSelector};

/// First day of half A, in the month before the payroll month.
pub const HALF_A_START_DAY: u32 = 27;
/// Last day of half A.
pub const HALF_A_END_DAY: u32 = 11;
/// First day of half B.
pub const HALF_B_START_DAY: u32 = 12;
/// Last day of half B.
pub const HALF_B_END_DAY: u32 = 26;

fn date(year: i32, month: u32, day: u32) -> EngineResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| EngineError::InvalidPeriod {
        message: format!("{:04}-{:02}-{:02} is not a valid date", year, month, day),
    })
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// Builds the period code `YYYYMMH`.
///
/// ```
/// use quincena_payroll::calculation::period_code;
/// use quincena_payroll::models::PayHalf;
///
/// assert_eq!(period_code(2024, 3, PayHalf::B), "202403B");
/// ```
pub fn period_code(year: i32, month: u32, half: PayHalf) -> String {
    format!("{:04}{:02}{}", year, month, half.letter())
}

/// Resolves the period for an explicit payroll `(year, month, half)`.
///
/// # Errors
///
/// Returns `InvalidPeriod` if `month` is outside 1..=12 or the year is out of
/// the calendar's range.
///
/// # Examples
///
/// ```
/// use quincena_payroll::calculation::period_for;
/// use quincena_payroll::models::PayHalf;
/// use chrono::NaiveDate;
///
/// let period = period_for(2024, 1, PayHalf::A).unwrap();
/// assert_eq!(period.start_date, NaiveDate::from_ymd_opt(2023, 12, 27).unwrap());
/// assert_eq!(period.end_date, NaiveDate::from_ymd_opt(2024, 1, 11).unwrap());
/// assert_eq!(period.code, "202401A");
/// ```
pub fn period_for(year: i32, month: u32, half: PayHalf) -> EngineResult<PayPeriod> {
    if !(1..=12).contains(&month) {
        return Err(EngineError::InvalidPeriod {
            message: format!("month must be between 1 and 12, got {}", month),
        });
    }

    let (start_date, end_date) = match half {
        PayHalf::A => {
            let (prev_year, prev_month) = previous_month(year, month);
            (
                date(prev_year, prev_month, HALF_A_START_DAY)?,
                date(year, month, HALF_A_END_DAY)?,
            )
        }
        PayHalf::B => (
            date(year, month, HALF_B_START_DAY)?,
            date(year, month, HALF_B_END_DAY)?,
        ),
    };

    Ok(PayPeriod {
        start_date,
        end_date,
        code: period_code(year, month, half),
        half,
    })
}

/// Resolves the period that contains `reference`.
///
/// ```
/// use quincena_payroll::calculation::period_containing;
/// use chrono::NaiveDate;
///
/// let d = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
/// assert_eq!(period_containing(d(2024, 3, 20)).unwrap().code, "202403B");
/// assert_eq!(period_containing(d(2024, 3, 5)).unwrap().code, "202403A");
/// assert_eq!(period_containing(d(2024, 12, 28)).unwrap().code, "202501A");
/// ```
pub fn period_containing(reference: NaiveDate) -> EngineResult<PayPeriod> {
    let (year, month, day) = (reference.year(), reference.month(), reference.day());

    match day {
        d if d <= HALF_A_END_DAY => period_for(year, month, PayHalf::A),
        d if d <= HALF_B_END_DAY => period_for(year, month, PayHalf::B),
        _ => {
            let (next_year, next_month) = next_month(year, month);
            period_for(next_year, next_month, PayHalf::A)
        }
    }
}

/// Resolves a caller's period selection.
pub fn resolve_period(selector: &PeriodSelector) -> EngineResult<PayPeriod> {
    match *selector {
        PeriodSelector::Date(reference) => period_containing(reference),
        PeriodSelector::Explicit { year, month, half } => period_for(year, month, half),
    }
}

/// The period immediately before `period`.
pub fn previous_period(period: &PayPeriod) -> EngineResult<PayPeriod> {
    match period.half {
        PayHalf::B => period_for(period.year(), period.month(), PayHalf::A),
        PayHalf::A => {
            let (year, month) = previous_month(period.year(), period.month());
            period_for(year, month, PayHalf::B)
        }
    }
}

/// The most recent `count` periods that have already started on `today`,
/// newest first.
///
/// Periods starting after `today` cannot be computed yet and are never
/// listed.
///
/// ```
/// use quincena_payroll::calculation::selectable_periods;
/// use chrono::NaiveDate;
///
/// let today = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
/// let codes: Vec<String> = selectable_periods(today, 3)
///     .into_iter()
///     .map(|p| p.code)
///     .collect();
/// assert_eq!(codes, vec!["202401A", "202312B", "202312A"]);
/// ```
pub fn selectable_periods(today: NaiveDate, count: usize) -> Vec<PayPeriod> {
    let mut periods = Vec::with_capacity(count);
    let mut current = period_containing(today).ok();

    while let Some(period) = current {
        if periods.len() == count {
            break;
        }
        current = previous_period(&period).ok();
        if period.start_date <= today {
            periods.push(period);
        }
    }

    periods
}

impl FromStr for PayPeriod {
    type Err = EngineError;

    /// Parses a period code such as `202403B`.
    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidPeriod {
            message: format!("'{}' is not a period code (expected YYYYMMH)", code),
        };

        if code.len() != 7 || !code.is_ascii() {
            return Err(invalid());
        }

        let year: i32 = code[0..4].parse().map_err(|_| invalid())?;
        let month: u32 = code[4..6].parse().map_err(|_| invalid())?;
        let half = match &code[6..] {
            "A" => PayHalf::A,
            "B" => PayHalf::B,
            _ => return Err(invalid()),
        };

        period_for(year, month, half)
    }
}
