//! Deduction values and caller-supplied overrides.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Maximum number of characters accepted in a payroll comment.
pub const MAX_COMMENT_CHARS: usize = 200;

/// A deduction amount tagged with who owns it.
///
/// `Fixed` values are authoritative (forced by the period regime or read from
/// an external service) and ignore caller overrides. `Editable` values are
/// defaults the caller may replace.
///
/// # Example
///
/// ```
/// use quincena_payroll::models::Deduction;
/// use rust_decimal::Decimal;
///
/// let ihss = Deduction::Editable(Decimal::new(59516, 2));
/// assert_eq!(ihss.with_override(Some(Decimal::ZERO)).amount(), Decimal::ZERO);
///
/// let meal = Deduction::Fixed(Decimal::new(350, 0));
/// assert_eq!(meal.with_override(Some(Decimal::ZERO)).amount(), Decimal::new(350, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "amount", rename_all = "snake_case")]
pub enum Deduction {
    /// Amount the caller cannot change.
    Fixed(Decimal),
    /// Default amount the caller may replace.
    Editable(Decimal),
}

impl Deduction {
    /// The amount, regardless of mode.
    pub fn amount(&self) -> Decimal {
        match self {
            Deduction::Fixed(amount) | Deduction::Editable(amount) => *amount,
        }
    }

    /// True if the caller may replace the amount.
    pub fn is_editable(&self) -> bool {
        matches!(self, Deduction::Editable(_))
    }

    /// Applies a caller override. Fixed values are returned unchanged.
    pub fn with_override(self, value: Option<Decimal>) -> Self {
        match (self, value) {
            (Deduction::Editable(_), Some(v)) => Deduction::Editable(v),
            (deduction, _) => deduction,
        }
    }
}

/// Names of the deduction lines on a payroll record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionField {
    /// Social-insurance contribution.
    Ihss,
    /// Income-tax withholding.
    Isr,
    /// Pension-fund contribution.
    Rap,
    /// Cafeteria/meal consumption.
    MealDeduction,
    /// Loan installment.
    LoanCollection,
    /// Municipal tax.
    LocalTax,
    /// Any other deduction.
    Other,
}

impl DeductionField {
    /// All deduction lines in statement order.
    pub const ALL: [DeductionField; 7] = [
        DeductionField::Ihss,
        DeductionField::Isr,
        DeductionField::Rap,
        DeductionField::MealDeduction,
        DeductionField::LoanCollection,
        DeductionField::LocalTax,
        DeductionField::Other,
    ];

    /// The field name used in errors and audit entries.
    pub fn as_str(self) -> &'static str {
        match self {
            DeductionField::Ihss => "ihss",
            DeductionField::Isr => "isr",
            DeductionField::Rap => "rap",
            DeductionField::MealDeduction => "meal_deduction",
            DeductionField::LoanCollection => "loan_collection",
            DeductionField::LocalTax => "local_tax",
            DeductionField::Other => "other",
        }
    }
}

impl fmt::Display for DeductionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values entered by the caller on top of the computed defaults.
///
/// Every field is optional; `None` keeps the engine default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayrollOverrides {
    /// Replaces the prorated company-covered incapacity amount.
    pub company_incapacity_amount: Option<Decimal>,
    /// Amount for insurer-covered incapacity (defaults to zero).
    pub insurer_incapacity_amount: Option<Decimal>,
    /// Signed correction added to earnings.
    pub adjustment: Option<Decimal>,
    /// Social-insurance contribution.
    pub ihss: Option<Decimal>,
    /// Income-tax withholding.
    pub isr: Option<Decimal>,
    /// Pension-fund contribution.
    pub rap: Option<Decimal>,
    /// Meal deduction, honored only when the meal service has no value.
    pub meal_deduction: Option<Decimal>,
    /// Loan installment.
    pub loan_collection: Option<Decimal>,
    /// Municipal tax.
    pub local_tax: Option<Decimal>,
    /// Any other deduction.
    pub other: Option<Decimal>,
    /// Free-text comment.
    pub comment: Option<String>,
}

impl PayrollOverrides {
    /// The override entered for a deduction line.
    pub fn deduction(&self, field: DeductionField) -> Option<Decimal> {
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

    /// Rejects negative amounts (except `adjustment`) and over-long comments.
    pub fn validate(&self) -> EngineResult<()> {
        let non_negative = [
            ("company_incapacity_amount", self.company_incapacity_amount),
            ("insurer_incapacity_amount", self.insurer_incapacity_amount),
        ]
        .into_iter()
        .chain(
            DeductionField::ALL
                .iter()
                .map(|field| (field.as_str(), self.deduction(*field))),
        );

        for (field, value) in non_negative {
            if let Some(v) = value.filter(|v| *v < Decimal::ZERO) {
                return Err(EngineError::invalid_field(
                    field,
                    format!("must not be negative, got {}", v),
                ));
            }
        }

        if let Some(comment) = &self.comment {
            let chars = comment.chars().count();
            if chars > MAX_COMMENT_CHARS {
                return Err(EngineError::invalid_field(
                    "comment",
                    format!(
                        "must be at most {} characters, got {}",
                        MAX_COMMENT_CHARS, chars
                    ),
                ));
            }
        }

        Ok(())
    }
}

/// One consumption line reported by the meal deduction service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealItem {
    /// Day of the consumption.
    pub date: chrono::NaiveDate,
    /// What was consumed.
    pub description: String,
    /// Charged amount.
    pub amount: Decimal,
}
