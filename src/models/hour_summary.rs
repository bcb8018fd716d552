//! Attendance summary supplied by the Hours Service.
//!
//! The engine performs no aggregation of attendance: the external service
//! returns categorized totals for the period, or the list of dates that keep
//! the period from being complete.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Overtime hours split by surcharge tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeHours {
    /// Hours paid with a 25% surcharge.
    #[serde(default)]
    pub surcharge_25: Decimal,
    /// Hours paid with a 50% surcharge.
    #[serde(default)]
    pub surcharge_50: Decimal,
    /// Hours paid with a 75% surcharge.
    #[serde(default)]
    pub surcharge_75: Decimal,
    /// Hours paid with a 100% surcharge.
    #[serde(default)]
    pub surcharge_100: Decimal,
}

impl OvertimeHours {
    /// Total overtime hours across all tiers.
    pub fn total(&self) -> Decimal {
        self.surcharge_25 + self.surcharge_50 + self.surcharge_75 + self.surcharge_100
    }
}

/// Categorized attendance for one employee and one pay period.
///
/// # Example
///
/// ```
/// use quincena_payroll::models::HourSummary;
/// use rust_decimal::Decimal;
///
/// let summary = HourSummary::full_period(Decimal::new(15, 0));
/// assert_eq!(summary.days_worked, Decimal::new(15, 0));
/// assert!(summary.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourSummary {
    /// Days worked.
    pub days_worked: Decimal,
    /// Vacation days taken.
    #[serde(default)]
    pub vacation_days: Decimal,
    /// Hours of justified (paid) leave.
    #[serde(default)]
    pub justified_leave_hours: Decimal,
    /// Incapacity hours paid by the company.
    #[serde(default)]
    pub company_incapacity_hours: Decimal,
    /// Incapacity hours covered by the social insurer.
    #[serde(default)]
    pub insurer_incapacity_hours: Decimal,
    /// Overtime hours by surcharge tier.
    #[serde(default)]
    pub overtime: OvertimeHours,
    /// Days in the period used as the proration denominator (normally 15).
    pub period_total_days: Decimal,
}

impl HourSummary {
    /// A summary where every day of a `total_days` period was worked.
    pub fn full_period(total_days: Decimal) -> Self {
        Self {
            days_worked: total_days,
            vacation_days: Decimal::ZERO,
            justified_leave_hours: Decimal::ZERO,
            company_incapacity_hours: Decimal::ZERO,
            insurer_incapacity_hours: Decimal::ZERO,
            overtime: OvertimeHours::default(),
            period_total_days: total_days,
        }
    }

    /// Rejects negative quantities and a zero proration denominator.
    pub fn validate(&self) -> EngineResult<()> {
        let quantities = [
            ("days_worked", self.days_worked),
            ("vacation_days", self.vacation_days),
            ("justified_leave_hours", self.justified_leave_hours),
            ("company_incapacity_hours", self.company_incapacity_hours),
            ("insurer_incapacity_hours", self.insurer_incapacity_hours),
            ("overtime.surcharge_25", self.overtime.surcharge_25),
            ("overtime.surcharge_50", self.overtime.surcharge_50),
            ("overtime.surcharge_75", self.overtime.surcharge_75),
            ("overtime.surcharge_100", self.overtime.surcharge_100),
            ("period_total_days", self.period_total_days),
        ];

        for (field, value) in quantities {
            if value < Decimal::ZERO {
                return Err(EngineError::invalid_field(
                    field,
                    format!("must not be negative, got {}", value),
                ));
            }
        }

        if self.period_total_days.is_zero() {
            return Err(EngineError::invalid_field(
                "period_total_days",
                "must be greater than zero to prorate the period",
            ));
        }

        Ok(())
    }
}

/// Dates that keep a period's attendance from being final.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceGaps {
    /// Dates with no attendance registered.
    #[serde(default)]
    pub missing_dates: Vec<NaiveDate>,
    /// Dates registered but not approved by a supervisor.
    #[serde(default)]
    pub unapproved_dates: Vec<NaiveDate>,
}

impl AttendanceGaps {
    /// True when no date is missing or unapproved.
    pub fn is_empty(&self) -> bool {
        self.missing_dates.is_empty() && self.unapproved_dates.is_empty()
    }
}
