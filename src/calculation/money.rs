//! Currency rounding.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept on every currency amount.
pub const CURRENCY_DP: u32 = 2;

/// Rounds an amount to cents, halves away from zero.
///
/// Every amount is rounded before it is summed, so totals built from rounded
/// lines reconcile exactly.
///
/// ```
/// use quincena_payroll::calculation::round_currency;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_currency(Decimal::from_str("46.45305").unwrap()).to_string(), "46.45");
/// assert_eq!(round_currency(Decimal::from_str("0.125").unwrap()).to_string(), "0.13");
/// assert_eq!(round_currency(Decimal::from_str("-0.125").unwrap()).to_string(), "-0.13");
/// ```
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero)
}
