//! Calculation logic for the payroll engine.
//!
//! Each stage of the pipeline is a pure function that returns its result
//! together with the [`AuditStep`](crate::models::AuditStep) describing it:
//! period resolution, salary rates and proration, overtime valuation, the
//! meal deduction and the half-of-month deduction regime, totals, and record
//! assembly.

pub(crate) mod assembler;
mod deductions;
mod money;
mod overtime;
mod period_resolver;
mod proration;
mod totals;

pub use assembler::{RecordParts, assemble_record, collect_earnings, period_name};
pub use deductions::{
    DeductionResult, MealDeductionOutcome, MealResolution, rap_amount, resolve_deductions,
    resolve_meal_deduction,
};
pub use money::{CURRENCY_DP, round_currency};
pub use overtime::{OvertimeTier, OvertimeValuation, value_overtime};
pub use period_resolver::{
    HALF_A_END_DAY, HALF_A_START_DAY, HALF_B_END_DAY, HALF_B_START_DAY, period_code,
    period_containing, period_for, previous_period, resolve_period, selectable_periods,
};
pub use proration::{ProrationResult, SalaryRates, prorate_period, salary_rates};
pub use totals::{Totals, check_attendance, check_overlap, compute_totals};
