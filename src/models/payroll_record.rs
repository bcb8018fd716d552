//! Payroll record models.
//!
//! This module contains the [`PayrollRecord`] type and its associated
//! structures that capture all outputs of a payroll computation: itemized
//! earnings, deductions, totals, and an audit trace of every rule applied.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Deduction, DeductionField, HourSummary, MealItem, PayPeriod};

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate conditions that don't prevent the computation
/// but should be shown to whoever reviews the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

/// Overtime pay by surcharge tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeAmounts {
    /// Pay for hours at +25%.
    pub surcharge_25: Decimal,
    /// Pay for hours at +50%.
    pub surcharge_50: Decimal,
    /// Pay for hours at +75%.
    pub surcharge_75: Decimal,
    /// Pay for hours at +100%.
    pub surcharge_100: Decimal,
}

impl OvertimeAmounts {
    /// Sum of all tiers.
    pub fn total(&self) -> Decimal {
        self.surcharge_25 + self.surcharge_50 + self.surcharge_75 + self.surcharge_100
    }
}

/// Itemized earnings of the period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Earnings {
    /// Prorated pay for days worked.
    pub worked_days_amount: Decimal,
    /// Prorated pay for vacation days.
    pub vacation_amount: Decimal,
    /// Prorated (or overridden) company-covered incapacity.
    pub company_incapacity_amount: Decimal,
    /// Justified leave paid by the hour.
    pub justified_leave_amount: Decimal,
    /// Sum of the four day-based categories above.
    pub subtotal_period: Decimal,
    /// Insurer-covered incapacity amount.
    pub insurer_incapacity_amount: Decimal,
    /// Value of the regular hours worked; informational, not part of totals.
    pub normal_hours_amount: Decimal,
    /// Overtime by tier.
    pub overtime: OvertimeAmounts,
    /// Signed correction.
    pub adjustment: Decimal,
}

/// Itemized deductions of the period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deductions {
    /// Social-insurance contribution.
    pub ihss: Deduction,
    /// Income-tax withholding.
    pub isr: Deduction,
    /// Pension-fund contribution.
    pub rap: Deduction,
    /// Cafeteria/meal consumption.
    pub meal_deduction: Deduction,
    /// Loan installment.
    pub loan_collection: Deduction,
    /// Municipal tax.
    pub local_tax: Deduction,
    /// Any other deduction.
    pub other: Deduction,
}

impl Deductions {
    /// Returns the value of one deduction line.
    pub fn get(&self, field: DeductionField) -> Deduction {
        match field {
            DeductionField::Ihss => self.ihss,
            DeductionField::Isr => self.isr,
            DeductionField::Rap => self.rap,
            DeductionField::MealDeduction => self.meal_deduction,
            DeductionField::LoanCollection => self.loan_collection,
            DeductionField::LocalTax => self.local_tax,
            DeductionField::Other => self.other,
        }
    }

    /// Sum of every deduction line.
    pub fn total(&self) -> Decimal {
        DeductionField::ALL
            .iter()
            .map(|field| self.get(*field).amount())
            .sum()
    }
}

/// Where the meal deduction came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum MealDeductionSource {
    /// Retrieved from the meal deduction service.
    Service {
        /// Itemized consumption reported by the service.
        items: Vec<MealItem>,
    },
    /// The service had no value; the amount is caller-editable.
    Fallback {
        /// The message to display next to the field.
        message: String,
    },
}

/// A fully computed payroll record for one employee and one pay period.
///
/// Records are built by [`crate::calculation::assemble_record`] and are not
/// mutated afterwards except through the engine's update path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    /// Identifier assigned by the repository; `None` until persisted.
    pub id: Option<Uuid>,
    /// The employee being paid.
    pub employee_id: String,
    /// The resolved pay period.
    pub period: PayPeriod,
    /// Display name of the period, e.g. "Segunda quincena de marzo de 2024".
    pub period_name: String,
    /// Monthly salary used for the computation.
    pub monthly_salary: Decimal,
    /// Half of the monthly salary.
    pub half_month_rate: Decimal,
    /// Hourly rate derived from the monthly salary.
    pub hourly_rate: Decimal,
    /// The attendance summary the record was computed from.
    pub hours: HourSummary,
    /// Itemized earnings.
    pub earnings: Earnings,
    /// Itemized deductions.
    pub deductions: Deductions,
    /// Origin of the meal deduction amount.
    pub meal_deduction_source: MealDeductionSource,
    /// Total earnings.
    pub total_earnings: Decimal,
    /// Total deductions.
    pub total_deductions: Decimal,
    /// Net amount payable.
    pub net_pay: Decimal,
    /// Free-text comment (at most 200 characters).
    pub comment: Option<String>,
    /// Once true the record can no longer be edited or deleted.
    pub paid: bool,
    /// When the record was computed.
    pub created_at: DateTime<Utc>,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}

impl PayrollRecord {
    /// True if `net_pay == total_earnings - total_deductions`.
    pub fn is_balanced(&self) -> bool {
        self.net_pay == self.total_earnings - self.total_deductions
    }
}
