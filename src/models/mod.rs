//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod deduction;
mod hour_summary;
mod pay_period;
mod payroll_record;
mod request;
mod salary_profile;

pub use deduction::{Deduction, DeductionField, MAX_COMMENT_CHARS, MealItem, PayrollOverrides};
pub use hour_summary::{AttendanceGaps, HourSummary, OvertimeHours};
pub use pay_period::{PayHalf, PayPeriod};
pub use payroll_record::{
    AuditStep, AuditTrace, AuditWarning, Deductions, Earnings, MealDeductionSource,
    OvertimeAmounts, PayrollRecord,
};
pub use request::{PayrollRequest, PeriodSelector};
pub use salary_profile::SalaryProfile;
