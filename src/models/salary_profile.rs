//! Salary profile of the employee being paid.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The salary data the engine needs about an employee.
///
/// # Example
///
/// ```
/// use quincena_payroll::models::SalaryProfile;
/// use rust_decimal::Decimal;
///
/// let profile = SalaryProfile {
///     employee_id: "emp_001".to_string(),
///     employee_code: Some("E-1001".to_string()),
///     monthly_salary: Decimal::new(15000, 0),
/// };
/// assert_eq!(profile.half_month_rate(), Decimal::new(7500, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryProfile {
    /// Unique identifier for the employee.
    pub employee_id: String,
    /// Payroll code used by the cafeteria system, when the employee has one.
    #[serde(default)]
    pub employee_code: Option<String>,
    /// Monthly salary.
    pub monthly_salary: Decimal,
}

impl SalaryProfile {
    /// Half of the monthly salary, the base for one quincena.
    pub fn half_month_rate(&self) -> Decimal {
        self.monthly_salary / Decimal::TWO
    }
}
