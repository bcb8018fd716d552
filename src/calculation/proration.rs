//! Salary rates and proration of day-based pay categories.
//!
//! The monthly salary is split into a half-month rate (the base of one
//! quincena) and an hourly rate over a commercial month of
//! `days_per_month × hours_per_day` hours. Day-based categories are prorated
//! against the period's total days; justified leave is paid by the hour so
//! that partial days can be granted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ScheduleConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, HourSummary, SalaryProfile};

use super::round_currency;

/// Rates derived from the monthly salary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRates {
    /// The monthly salary.
    pub monthly_salary: Decimal,
    /// Monthly salary / 2.
    pub half_month_rate: Decimal,
    /// Monthly salary / (days_per_month × hours_per_day), unrounded.
    pub hourly_rate: Decimal,
}

/// Derives the half-month and hourly rates from a salary profile.
///
/// # Errors
///
/// - `InvalidField("monthly_salary")` if the salary is negative
/// - `InvalidField("schedule")` if the configured month has no hours
///
/// # Examples
///
/// ```
/// use quincena_payroll::calculation::salary_rates;
/// use quincena_payroll::config::ScheduleConfig;
/// use quincena_payroll::models::SalaryProfile;
/// use rust_decimal::Decimal;
///
/// let schedule = ScheduleConfig {
///     days_per_month: Decimal::new(30, 0),
///     hours_per_day: Decimal::new(8, 0),
/// };
/// let profile = SalaryProfile {
///     employee_id: "emp_001".to_string(),
///     employee_code: None,
///     monthly_salary: Decimal::new(15000, 0),
/// };
///
/// let rates = salary_rates(&profile, &schedule).unwrap();
/// assert_eq!(rates.half_month_rate, Decimal::new(7500, 0));
/// assert_eq!(rates.hourly_rate, Decimal::new(625, 1)); // 62.5
/// ```
pub fn salary_rates(profile: &SalaryProfile, schedule: &ScheduleConfig) -> EngineResult<SalaryRates> {
    if profile.monthly_salary < Decimal::ZERO {
        return Err(EngineError::invalid_field(
            "monthly_salary",
            format!("must not be negative, got {}", profile.monthly_salary),
        ));
    }

    let hours_per_month = schedule.hours_per_month();
    if hours_per_month <= Decimal::ZERO {
        return Err(EngineError::invalid_field(
            "schedule",
            "days_per_month × hours_per_day must be greater than zero",
        ));
    }

    Ok(SalaryRates {
        monthly_salary: profile.monthly_salary,
        half_month_rate: profile.half_month_rate(),
        hourly_rate: profile.monthly_salary / hours_per_month,
    })
}

/// The result of prorating a period's day-based categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProrationResult {
    /// Pay for days worked.
    pub worked_days_amount: Decimal,
    /// Pay for vacation days.
    pub vacation_amount: Decimal,
    /// Company-covered incapacity, computed or overridden.
    pub company_incapacity_amount: Decimal,
    /// True if the company incapacity amount came from the caller.
    pub company_incapacity_overridden: bool,
    /// Justified leave, paid by the hour.
    pub justified_leave_amount: Decimal,
    /// Sum of the four amounts above.
    pub subtotal_period: Decimal,
    /// The audit step recording this proration.
    pub audit_step: AuditStep,
}

fn prorate(days: Decimal, total_days: Decimal, half_month_rate: Decimal) -> Decimal {
    round_currency(half_month_rate * days / total_days)
}

/// Prorates worked days, vacation, company incapacity and justified leave.
///
/// Company-covered incapacity arrives in hours and is converted to days with
/// the schedule's hours per day. Its computed value is only a default: when
/// `company_incapacity_override` is `Some`, that amount is used instead.
///
/// # Errors
///
/// Returns `InvalidField("period_total_days")` if the period has zero days;
/// no division is attempted.
pub fn prorate_period(
    rates: &SalaryRates,
    summary: &HourSummary,
    schedule: &ScheduleConfig,
    company_incapacity_override: Option<Decimal>,
    step_number: u32,
) -> EngineResult<ProrationResult> {
    let total_days = summary.period_total_days;
    if total_days <= Decimal::ZERO {
        return Err(EngineError::invalid_field(
            "period_total_days",
            "must be greater than zero to prorate the period",
        ));
    }
    if schedule.hours_per_day <= Decimal::ZERO {
        return Err(EngineError::invalid_field(
            "schedule",
            "hours_per_day must be greater than zero",
        ));
    }

    let worked_days_amount = prorate(summary.days_worked, total_days, rates.half_month_rate);
    let vacation_amount = prorate(summary.vacation_days, total_days, rates.half_month_rate);

    let company_incapacity_days = summary.company_incapacity_hours / schedule.hours_per_day;
    let computed_incapacity = prorate(company_incapacity_days, total_days, rates.half_month_rate);
    let company_incapacity_amount = company_incapacity_override
        .map(round_currency)
        .unwrap_or(computed_incapacity);

    let justified_leave_amount = round_currency(summary.justified_leave_hours * rates.hourly_rate);

    let subtotal_period =
        worked_days_amount + vacation_amount + company_incapacity_amount + justified_leave_amount;

    let reasoning = format!(
        "{} of {} days worked at half-month rate {} = {}; subtotal for the period {}",
        summary.days_worked.normalize(),
        total_days.normalize(),
        round_currency(rates.half_month_rate),
        worked_days_amount,
        subtotal_period
    );

    let audit_step = AuditStep {
        step_number,
        rule_id: "period_proration".to_string(),
        rule_name: "Period Proration".to_string(),
        input: serde_json::json!({
            "half_month_rate": rates.half_month_rate.normalize().to_string(),
            "hourly_rate": round_currency(rates.hourly_rate).to_string(),
            "days_worked": summary.days_worked.normalize().to_string(),
            "vacation_days": summary.vacation_days.normalize().to_string(),
            "company_incapacity_hours": summary.company_incapacity_hours.normalize().to_string(),
            "justified_leave_hours": summary.justified_leave_hours.normalize().to_string(),
            "period_total_days": total_days.normalize().to_string(),
            "company_incapacity_override": company_incapacity_override.map(|v| v.to_string())
        }),
        output: serde_json::json!({
            "worked_days_amount": worked_days_amount.to_string(),
            "vacation_amount": vacation_amount.to_string(),
            "company_incapacity_amount": company_incapacity_amount.to_string(),
            "computed_company_incapacity_amount": computed_incapacity.to_string(),
            "justified_leave_amount": justified_leave_amount.to_string(),
            "subtotal_period": subtotal_period.to_string()
        }),
        reasoning,
    };

    Ok(ProrationResult {
        worked_days_amount,
        vacation_amount,
        company_incapacity_amount,
        company_incapacity_overridden: company_incapacity_override.is_some(),
        justified_leave_amount,
        subtotal_period,
        audit_step,
    })
}
