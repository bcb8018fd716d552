//! Totals and the fatal validation gates.
//!
//! Every line reaching this stage is already rounded to cents, so
//! `net_pay = total_earnings - total_deductions` holds exactly.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceGaps, AuditStep, Deductions, Earnings, PayPeriod, PayrollRecord};

/// Earnings, deductions and net pay of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Subtotal + insurer incapacity + overtime + adjustment.
    pub total_earnings: Decimal,
    /// Sum of every deduction line.
    pub total_deductions: Decimal,
    /// Earnings minus deductions.
    pub net_pay: Decimal,
    /// The audit step recording the totals.
    pub audit_step: AuditStep,
}

/// Sums earnings and deductions.
pub fn compute_totals(earnings: &Earnings, deductions: &Deductions, step_number: u32) -> Totals {
    let overtime_total = earnings.overtime.total();
    let total_earnings = earnings.subtotal_period
        + earnings.insurer_incapacity_amount
        + overtime_total
        + earnings.adjustment;
    let total_deductions = deductions.total();
    let net_pay = total_earnings - total_deductions;

    let audit_step = AuditStep {
        step_number,
        rule_id: "totals".to_string(),
        rule_name: "Totals".to_string(),
        input: serde_json::json!({
            "subtotal_period": earnings.subtotal_period.to_string(),
            "insurer_incapacity_amount": earnings.insurer_incapacity_amount.to_string(),
            "overtime_total": overtime_total.to_string(),
            "adjustment": earnings.adjustment.to_string()
        }),
        output: serde_json::json!({
            "total_earnings": total_earnings.to_string(),
            "total_deductions": total_deductions.to_string(),
            "net_pay": net_pay.to_string()
        }),
        reasoning: format!(
            "Earnings {} minus deductions {} = net pay {}",
            total_earnings, total_deductions, net_pay
        ),
    };

    Totals {
        total_earnings,
        total_deductions,
        net_pay,
        audit_step,
    }
}

/// Fails if `period` overlaps any of the employee's stored records.
///
/// `exclude` skips the record being updated.
///
/// # Errors
///
/// Returns `PeriodOverlap` naming the first conflicting record.
pub fn check_overlap(
    employee_id: &str,
    period: &PayPeriod,
    existing: &[PayrollRecord],
    exclude: Option<Uuid>,
) -> EngineResult<()> {
    let conflict = existing
        .iter()
        .filter(|record| record.employee_id == employee_id)
        .filter(|record| exclude.is_none() || record.id != exclude)
        .find(|record| {
            record
                .period
                .overlaps(period.start_date, period.end_date)
        });

    match conflict {
        Some(record) => Err(EngineError::PeriodOverlap {
            employee_id: employee_id.to_string(),
            start_date: period.start_date,
            end_date: period.end_date,
            existing_code: record.period.code.clone(),
        }),
        None => Ok(()),
    }
}

/// Fails if any date of the period lacks registered or approved attendance.
///
/// # Errors
///
/// Returns `AttendanceIncomplete` carrying the offending dates, sorted.
pub fn check_attendance(employee_id: &str, gaps: &AttendanceGaps) -> EngineResult<()> {
    if gaps.is_empty() {
        return Ok(());
    }

    let mut missing_dates = gaps.missing_dates.clone();
    let mut unapproved_dates = gaps.unapproved_dates.clone();
    missing_dates.sort();
    missing_dates.dedup();
    unapproved_dates.sort();
    unapproved_dates.dedup();

    Err(EngineError::AttendanceIncomplete {
        employee_id: employee_id.to_string(),
        missing_dates,
        unapproved_dates,
    })
}
