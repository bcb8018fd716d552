//! Payroll record assembly.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::{
    AuditTrace, Deductions, Earnings, HourSummary, MealDeductionSource, PayHalf, PayPeriod,
    PayrollRecord,
};

use super::{OvertimeValuation, ProrationResult, SalaryRates, compute_totals, round_currency};

const MONTH_NAMES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// The display name of a period, e.g. "Segunda quincena de marzo de 2024".
///
/// ```
/// use quincena_payroll::calculation::{period_for, period_name};
/// use quincena_payroll::models::PayHalf;
///
/// let period = period_for(2024, 1, PayHalf::A).unwrap();
/// assert_eq!(period_name(&period), "Primera quincena de enero de 2024");
/// ```
pub fn period_name(period: &PayPeriod) -> String {
    let ordinal = match period.half {
        PayHalf::A => "Primera",
        PayHalf::B => "Segunda",
    };
    let month = MONTH_NAMES
        .get(period.month() as usize - 1)
        .copied()
        .unwrap_or("?");
    format!("{} quincena de {} de {}", ordinal, month, period.year())
}

/// Collects the earnings lines from the proration and overtime stages.
///
/// The insurer-covered incapacity amount and the adjustment come straight
/// from the caller and default to zero.
pub fn collect_earnings(
    proration: &ProrationResult,
    overtime: &OvertimeValuation,
    insurer_incapacity_amount: Option<Decimal>,
    adjustment: Option<Decimal>,
) -> Earnings {
    Earnings {
        worked_days_amount: proration.worked_days_amount,
        vacation_amount: proration.vacation_amount,
        company_incapacity_amount: proration.company_incapacity_amount,
        justified_leave_amount: proration.justified_leave_amount,
        subtotal_period: proration.subtotal_period,
        insurer_incapacity_amount: round_currency(insurer_incapacity_amount.unwrap_or_default()),
        normal_hours_amount: overtime.normal_hours_amount,
        overtime: overtime.amounts.clone(),
        adjustment: round_currency(adjustment.unwrap_or_default()),
    }
}

/// Everything the pipeline produced for one record.
#[derive(Debug, Clone)]
pub struct RecordParts {
    /// The employee being paid.
    pub employee_id: String,
    /// The resolved period.
    pub period: PayPeriod,
    /// Salary rates.
    pub rates: SalaryRates,
    /// The attendance summary.
    pub hours: HourSummary,
    /// Earnings lines.
    pub earnings: Earnings,
    /// Deduction lines.
    pub deductions: Deductions,
    /// Origin of the meal deduction.
    pub meal_deduction_source: MealDeductionSource,
    /// Caller comment.
    pub comment: Option<String>,
    /// Steps and warnings accumulated so far.
    pub audit_trace: AuditTrace,
    /// Stamp from the engine clock.
    pub created_at: DateTime<Utc>,
}

/// Totals the parts and packages them into a record.
///
/// The totals step is appended to the audit trace. The record has no id
/// until a repository stores it.
pub fn assemble_record(parts: RecordParts) -> PayrollRecord {
    let RecordParts {
        employee_id,
        period,
        rates,
        hours,
        earnings,
        deductions,
        meal_deduction_source,
        comment,
        mut audit_trace,
        created_at,
    } = parts;

    let step_number = audit_trace.steps.len() as u32 + 1;
    let totals = compute_totals(&earnings, &deductions, step_number);
    audit_trace.steps.push(totals.audit_step);

    PayrollRecord {
        id: None,
        period_name: period_name(&period),
        employee_id,
        period,
        monthly_salary: rates.monthly_salary,
        half_month_rate: round_currency(rates.half_month_rate),
        hourly_rate: round_currency(rates.hourly_rate),
        hours,
        earnings,
        deductions,
        meal_deduction_source,
        total_earnings: totals.total_earnings,
        total_deductions: totals.total_deductions,
        net_pay: totals.net_pay,
        comment: comment.filter(|c| !c.trim().is_empty()),
        paid: false,
        created_at,
        audit_trace,
    }
}
