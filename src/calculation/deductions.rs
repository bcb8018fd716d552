//! Deduction regimes.
//!
//! Which deductions apply depends only on the half of the month:
//!
//! - **Half A**: IHSS, ISR, RAP, loan collection and local tax are fixed at
//!   zero whatever the caller enters. Meal deduction and "other" still apply.
//! - **Half B**: IHSS defaults to the statutory fixed amount, RAP to the rate
//!   over the salary floor; ISR, loan collection, local tax and "other" are
//!   editable with a zero default.
//!
//! The meal deduction always comes from the meal deduction service. When the
//! service has a value it is fixed; when it reports an error the line falls
//! back to an editable zero and the message is kept for display.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{RapConfig, StatutoryRates};
use crate::models::{
    AuditStep, AuditWarning, Deduction, DeductionField, Deductions, MealDeductionSource, MealItem,
    PayHalf, PayrollOverrides,
};

use super::round_currency;

/// Pension-fund contribution: the rate applied to the part of the monthly
/// salary above the floor, never negative.
///
/// ```
/// use quincena_payroll::calculation::rap_amount;
/// use quincena_payroll::config::RapConfig;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let dec = |s: &str| Decimal::from_str(s).unwrap();
/// let rap = RapConfig { floor: dec("11903.13"), rate: dec("0.015") };
///
/// assert_eq!(rap_amount(dec("20000"), &rap), dec("121.45"));
/// assert_eq!(rap_amount(dec("11903.13"), &rap), Decimal::ZERO);
/// assert_eq!(rap_amount(dec("8000"), &rap), Decimal::ZERO);
/// ```
pub fn rap_amount(monthly_salary: Decimal, rap: &RapConfig) -> Decimal {
    let excess = monthly_salary - rap.floor;
    if excess <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round_currency(excess * rap.rate)
}

/// What the meal deduction service answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MealDeductionOutcome {
    /// The service returned an amount for the period.
    Found {
        /// Total to deduct.
        amount: Decimal,
        /// Itemized consumption.
        items: Vec<MealItem>,
    },
    /// The service reported an error or could not be reached.
    Unavailable {
        /// The message to show next to the field.
        message: String,
    },
}

/// The resolved meal deduction line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealResolution {
    /// `Fixed` when the service supplied it, otherwise an editable zero.
    pub deduction: Deduction,
    /// Where the amount came from.
    pub source: MealDeductionSource,
    /// Present when the service had no value.
    pub warning: Option<AuditWarning>,
    /// The audit step recording this resolution.
    pub audit_step: AuditStep,
}

/// Turns the meal deduction service's answer into a deduction line.
///
/// A negative amount from the service is treated like a service error.
pub fn resolve_meal_deduction(outcome: MealDeductionOutcome, step_number: u32) -> MealResolution {
    let outcome = match outcome {
        MealDeductionOutcome::Found { amount, .. } if amount < Decimal::ZERO => {
            MealDeductionOutcome::Unavailable {
                message: format!("meal deduction service returned a negative amount ({})", amount),
            }
        }
        other => other,
    };

    match outcome {
        MealDeductionOutcome::Found { amount, items } => {
            let amount = round_currency(amount);
            let audit_step = AuditStep {
                step_number,
                rule_id: "meal_deduction".to_string(),
                rule_name: "Meal Deduction".to_string(),
                input: serde_json::json!({ "items": items.len() }),
                output: serde_json::json!({
                    "amount": amount.to_string(),
                    "mode": "fixed"
                }),
                reasoning: format!(
                    "Meal deduction service reported {} across {} items; the amount is fixed",
                    amount,
                    items.len()
                ),
            };
            MealResolution {
                deduction: Deduction::Fixed(amount),
                source: MealDeductionSource::Service { items },
                warning: None,
                audit_step,
            }
        }
        MealDeductionOutcome::Unavailable { message } => {
            let audit_step = AuditStep {
                step_number,
                rule_id: "meal_deduction".to_string(),
                rule_name: "Meal Deduction".to_string(),
                input: serde_json::json!({ "error": message }),
                output: serde_json::json!({
                    "amount": "0",
                    "mode": "editable"
                }),
                reasoning: format!(
                    "Meal deduction service had no value ({}); defaulting to an editable zero",
                    message
                ),
            };
            MealResolution {
                deduction: Deduction::Editable(Decimal::ZERO),
                warning: Some(AuditWarning {
                    code: "MEAL_DEDUCTION_UNAVAILABLE".to_string(),
                    message: message.clone(),
                    severity: "medium".to_string(),
                }),
                source: MealDeductionSource::Fallback { message },
                audit_step,
            }
        }
    }
}

/// The result of resolving the deduction regime for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionResult {
    /// Every deduction line with its mode.
    pub deductions: Deductions,
    /// Overrides that were discarded because the line is fixed.
    pub warnings: Vec<AuditWarning>,
    /// The audit step recording this resolution.
    pub audit_step: AuditStep,
}

fn regime_default(
    field: DeductionField,
    half: PayHalf,
    monthly_salary: Decimal,
    statutory: &StatutoryRates,
    meal: Deduction,
) -> Deduction {
    match (half, field) {
        (_, DeductionField::MealDeduction) => meal,
        (_, DeductionField::Other) => Deduction::Editable(Decimal::ZERO),
        (PayHalf::A, _) => Deduction::Fixed(Decimal::ZERO),
        (PayHalf::B, DeductionField::Ihss) => {
            Deduction::Editable(round_currency(statutory.ihss_fixed))
        }
        (PayHalf::B, DeductionField::Rap) => {
            Deduction::Editable(rap_amount(monthly_salary, &statutory.rap))
        }
        (PayHalf::B, _) => Deduction::Editable(Decimal::ZERO),
    }
}

/// Resolves every deduction line for the period's half and applies the
/// caller's overrides to the editable ones.
///
/// `meal` is the line produced by [`resolve_meal_deduction`].
///
/// # Examples
///
/// ```
/// use quincena_payroll::calculation::resolve_deductions;
/// use quincena_payroll::config::{RapConfig, StatutoryRates};
/// use quincena_payroll::models::{Deduction, PayHalf, PayrollOverrides};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let dec = |s: &str| Decimal::from_str(s).unwrap();
/// let statutory = StatutoryRates {
///     effective_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     ihss_fixed: dec("595.16"),
///     rap: RapConfig { floor: dec("11903.13"), rate: dec("0.015") },
/// };
/// let overrides = PayrollOverrides { isr: Some(dec("300")), ..Default::default() };
///
/// let first_half = resolve_deductions(
///     PayHalf::A, dec("15000"), &statutory, Deduction::Editable(Decimal::ZERO), &overrides, 1,
/// );
/// assert_eq!(first_half.deductions.isr, Deduction::Fixed(Decimal::ZERO));
/// assert_eq!(first_half.warnings.len(), 1);
///
/// let second_half = resolve_deductions(
///     PayHalf::B, dec("15000"), &statutory, Deduction::Editable(Decimal::ZERO), &overrides, 1,
/// );
/// assert_eq!(second_half.deductions.isr, Deduction::Editable(dec("300")));
/// assert_eq!(second_half.deductions.rap.amount(), dec("46.45"));
/// ```
pub fn resolve_deductions(
    half: PayHalf,
    monthly_salary: Decimal,
    statutory: &StatutoryRates,
    meal: Deduction,
    overrides: &PayrollOverrides,
    step_number: u32,
) -> DeductionResult {
    let mut warnings = Vec::new();
    let mut input = serde_json::Map::new();
    let mut output = serde_json::Map::new();

    let mut resolve = |field: DeductionField| -> Deduction {
        let default = regime_default(field, half, monthly_salary, statutory, meal);
        let entered = overrides.deduction(field).map(round_currency);
        let resolved = default.with_override(entered);

        if let Some(value) = entered {
            input.insert(field.to_string(), serde_json::json!(value.to_string()));
            if !default.is_editable() && value != default.amount() {
                warnings.push(AuditWarning {
                    code: "OVERRIDE_IGNORED".to_string(),
                    message: format!(
                        "{} is fixed at {} for this period; entered value {} was ignored",
                        field,
                        default.amount(),
                        value
                    ),
                    severity: "low".to_string(),
                });
            }
        }
        output.insert(
            field.to_string(),
            serde_json::to_value(resolved).unwrap_or(serde_json::Value::Null),
        );
        resolved
    };

    let deductions = Deductions {
        ihss: resolve(DeductionField::Ihss),
        isr: resolve(DeductionField::Isr),
        rap: resolve(DeductionField::Rap),
        meal_deduction: resolve(DeductionField::MealDeduction),
        loan_collection: resolve(DeductionField::LoanCollection),
        local_tax: resolve(DeductionField::LocalTax),
        other: resolve(DeductionField::Other),
    };

    input.insert("half".to_string(), serde_json::json!(half.to_string()));
    input.insert(
        "monthly_salary".to_string(),
        serde_json::json!(monthly_salary.normalize().to_string()),
    );

    let reasoning = match half {
        PayHalf::A => format!(
            "First-half period: IHSS, ISR, RAP, loan collection and local tax fixed at zero; deductions total {}",
            deductions.total()
        ),
        PayHalf::B => format!(
            "Second-half period: IHSS {} and RAP {} ({} × salary above {}); deductions total {}",
            deductions.ihss.amount(),
            deductions.rap.amount(),
            statutory.rap.rate.normalize(),
            statutory.rap.floor,
            deductions.total()
        ),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "deduction_regime".to_string(),
        rule_name: "Deduction Regime".to_string(),
        input: serde_json::Value::Object(input),
        output: serde_json::Value::Object(output),
        reasoning,
    };

    DeductionResult {
        deductions,
        warnings,
        audit_step,
    }
}
