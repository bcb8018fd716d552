//! Overtime valuation.
//!
//! Overtime hours arrive already split into surcharge tiers. Each tier is paid
//! at the hourly rate times a fixed multiplier:
//!
//! | Tier | Multiplier |
//! |------|------------|
//! | 25%  | 1.25       |
//! | 50%  | 1.50       |
//! | 75%  | 1.75       |
//! | 100% | 2.00       |
//!
//! The value of the regular hours is computed alongside for display; it is
//! already covered by the prorated days and never enters the totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{OvertimeMultipliers, ScheduleConfig};
use crate::models::{AuditStep, HourSummary, OvertimeAmounts, OvertimeHours};

use super::round_currency;

/// A surcharge tier for overtime hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OvertimeTier {
    /// +25%.
    Surcharge25,
    /// +50%.
    Surcharge50,
    /// +75%.
    Surcharge75,
    /// +100%.
    Surcharge100,
}

impl OvertimeTier {
    /// All tiers, lowest surcharge first.
    pub const ALL: [OvertimeTier; 4] = [
        OvertimeTier::Surcharge25,
        OvertimeTier::Surcharge50,
        OvertimeTier::Surcharge75,
        OvertimeTier::Surcharge100,
    ];

    /// The configured multiplier for this tier.
    pub fn multiplier(self, multipliers: &OvertimeMultipliers) -> Decimal {
        match self {
            OvertimeTier::Surcharge25 => multipliers.surcharge_25,
            OvertimeTier::Surcharge50 => multipliers.surcharge_50,
            OvertimeTier::Surcharge75 => multipliers.surcharge_75,
            OvertimeTier::Surcharge100 => multipliers.surcharge_100,
        }
    }

    /// The hours recorded for this tier.
    pub fn hours(self, overtime: &OvertimeHours) -> Decimal {
        match self {
            OvertimeTier::Surcharge25 => overtime.surcharge_25,
            OvertimeTier::Surcharge50 => overtime.surcharge_50,
            OvertimeTier::Surcharge75 => overtime.surcharge_75,
            OvertimeTier::Surcharge100 => overtime.surcharge_100,
        }
    }

    fn key(self) -> &'static str {
        match self {
            OvertimeTier::Surcharge25 => "surcharge_25",
            OvertimeTier::Surcharge50 => "surcharge_50",
            OvertimeTier::Surcharge75 => "surcharge_75",
            OvertimeTier::Surcharge100 => "surcharge_100",
        }
    }
}

/// The result of valuing a period's overtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeValuation {
    /// Value of the regular hours worked (informational only).
    pub normal_hours_amount: Decimal,
    /// Pay per tier.
    pub amounts: OvertimeAmounts,
    /// The audit step recording this valuation.
    pub audit_step: AuditStep,
}

/// Values tiered overtime at the hourly rate.
///
/// # Examples
///
/// ```
/// use quincena_payroll::calculation::value_overtime;
/// use quincena_payroll::config::{OvertimeMultipliers, ScheduleConfig};
/// use quincena_payroll::models::HourSummary;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let dec = |s: &str| Decimal::from_str(s).unwrap();
/// let schedule = ScheduleConfig { days_per_month: dec("30"), hours_per_day: dec("8") };
/// let multipliers = OvertimeMultipliers {
///     surcharge_25: dec("1.25"),
///     surcharge_50: dec("1.50"),
///     surcharge_75: dec("1.75"),
///     surcharge_100: dec("2.00"),
/// };
/// let mut summary = HourSummary::full_period(dec("15"));
/// summary.overtime.surcharge_100 = dec("3");
///
/// // 15000 / 240 = 62.50 per hour
/// let result = value_overtime(dec("62.5"), &summary, &schedule, &multipliers, 1);
/// assert_eq!(result.amounts.surcharge_100, dec("375.00"));
/// assert_eq!(result.normal_hours_amount, dec("7500.00"));
/// ```
pub fn value_overtime(
    hourly_rate: Decimal,
    summary: &HourSummary,
    schedule: &ScheduleConfig,
    multipliers: &OvertimeMultipliers,
    step_number: u32,
) -> OvertimeValuation {
    let normal_hours = summary.days_worked * schedule.hours_per_day;
    let normal_hours_amount = round_currency(normal_hours * hourly_rate);

    let tier_amount = |tier: OvertimeTier| {
        round_currency(tier.hours(&summary.overtime) * hourly_rate * tier.multiplier(multipliers))
    };

    let amounts = OvertimeAmounts {
        surcharge_25: tier_amount(OvertimeTier::Surcharge25),
        surcharge_50: tier_amount(OvertimeTier::Surcharge50),
        surcharge_75: tier_amount(OvertimeTier::Surcharge75),
        surcharge_100: tier_amount(OvertimeTier::Surcharge100),
    };

    let mut input = serde_json::Map::new();
    let mut output = serde_json::Map::new();
    for tier in OvertimeTier::ALL {
        input.insert(
            tier.key().to_string(),
            serde_json::json!({
                "hours": tier.hours(&summary.overtime).normalize().to_string(),
                "multiplier": tier.multiplier(multipliers).normalize().to_string()
            }),
        );
        output.insert(tier.key().to_string(), serde_json::json!(tier_amount(tier).to_string()));
    }
    input.insert(
        "hourly_rate".to_string(),
        serde_json::json!(round_currency(hourly_rate).to_string()),
    );
    input.insert(
        "normal_hours".to_string(),
        serde_json::json!(normal_hours.normalize().to_string()),
    );
    output.insert(
        "normal_hours_amount".to_string(),
        serde_json::json!(normal_hours_amount.to_string()),
    );
    output.insert(
        "overtime_total".to_string(),
        serde_json::json!(amounts.total().to_string()),
    );

    let total_hours = summary.overtime.total();
    let reasoning = if total_hours > Decimal::ZERO {
        format!(
            "{} overtime hours valued at {} across surcharge tiers; {} regular hours ({}) shown for reference only",
            total_hours.normalize(),
            amounts.total(),
            normal_hours.normalize(),
            normal_hours_amount
        )
    } else {
        format!(
            "No overtime recorded; {} regular hours ({}) shown for reference only",
            normal_hours.normalize(),
            normal_hours_amount
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "overtime_valuation".to_string(),
        rule_name: "Overtime Valuation".to_string(),
        input: serde_json::Value::Object(input),
        output: serde_json::Value::Object(output),
        reasoning,
    };

    OvertimeValuation {
        normal_hours_amount,
        amounts,
        audit_step,
    }
}
