//! Computation request types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{PayHalf, PayrollOverrides, SalaryProfile};

/// How the caller identifies the pay period to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodSelector {
    /// The period containing this date.
    Date(NaiveDate),
    /// An explicit payroll month and half.
    Explicit {
        /// Payroll year.
        year: i32,
        /// Payroll month (1-12).
        month: u32,
        /// Half of the month.
        half: PayHalf,
    },
}

/// Everything the caller provides to compute one payroll record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRequest {
    /// The employee's salary data.
    pub salary: SalaryProfile,
    /// The period to compute; required.
    pub period: Option<PeriodSelector>,
    /// Values entered on top of the computed defaults.
    #[serde(default)]
    pub overrides: PayrollOverrides,
}
