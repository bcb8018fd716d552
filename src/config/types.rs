//! Configuration types for the payroll engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Working-time conventions used to derive rates from a monthly salary.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Commercial days per month (the hourly divisor's day count).
    pub days_per_month: Decimal,
    /// Regular hours per working day.
    pub hours_per_day: Decimal,
}

impl ScheduleConfig {
    /// Hours in a commercial month; the monthly salary divided by this is
    /// the hourly rate.
    pub fn hours_per_month(&self) -> Decimal {
        self.days_per_month * self.hours_per_day
    }
}

/// Multipliers applied to the hourly rate for each overtime tier.
#[derive(Debug, Clone, Deserialize)]
pub struct OvertimeMultipliers {
    /// The 25% surcharge tier.
    pub surcharge_25: Decimal,
    /// The 50% surcharge tier.
    pub surcharge_50: Decimal,
    /// The 75% surcharge tier.
    pub surcharge_75: Decimal,
    /// The 100% surcharge tier.
    pub surcharge_100: Decimal,
}

/// Timeouts for the external services, in milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceTimeouts {
    /// Bound on the hours service call.
    pub hours_service_ms: u64,
    /// Bound on the meal deduction service call.
    pub meal_deduction_service_ms: u64,
}

/// Contents of `engine.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// Working-time conventions.
    pub schedule: ScheduleConfig,
    /// Overtime multipliers.
    pub overtime: OvertimeMultipliers,
    /// External service timeouts.
    pub timeouts: ServiceTimeouts,
}

/// Pension-fund rule: a percentage of the salary above a floor.
#[derive(Debug, Clone, Deserialize)]
pub struct RapConfig {
    /// Monthly salary below which nothing is withheld.
    pub floor: Decimal,
    /// Fraction of the excess withheld (e.g. 0.015).
    pub rate: Decimal,
}

/// Statutory deduction constants effective from a date.
#[derive(Debug, Clone, Deserialize)]
pub struct StatutoryRates {
    /// The first period end date these constants apply to.
    pub effective_date: NaiveDate,
    /// Fixed social-insurance contribution per second-half period.
    pub ihss_fixed: Decimal,
    /// Pension-fund rule.
    pub rap: RapConfig,
}

/// The complete payroll configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct PayrollConfig {
    settings: EngineSettings,
    /// Statutory rates by effective date (sorted oldest first).
    statutory: Vec<StatutoryRates>,
}

impl PayrollConfig {
    /// Creates a new PayrollConfig from its component parts.
    pub fn new(settings: EngineSettings, statutory: Vec<StatutoryRates>) -> Self {
        let mut sorted = statutory;
        sorted.sort_by(|a, b| a.effective_date.cmp(&b.effective_date));
        Self {
            settings,
            statutory: sorted,
        }
    }

    /// Returns the working-time conventions.
    pub fn schedule(&self) -> &ScheduleConfig {
        &self.settings.schedule
    }

    /// Returns the overtime multipliers.
    pub fn overtime(&self) -> &OvertimeMultipliers {
        &self.settings.overtime
    }

    /// Returns the service timeouts.
    pub fn timeouts(&self) -> &ServiceTimeouts {
        &self.settings.timeouts
    }

    /// Returns all statutory rate configurations.
    pub fn statutory_rates(&self) -> &[StatutoryRates] {
        &self.statutory
    }

    /// The statutory rates in force for a period ending on `date`.
    pub fn statutory_for(&self, date: NaiveDate) -> Option<&StatutoryRates> {
        self.statutory.iter().rfind(|r| r.effective_date <= date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn rates(effective: &str, ihss: &str) -> StatutoryRates {
        StatutoryRates {
            effective_date: NaiveDate::from_str(effective).unwrap(),
            ihss_fixed: dec(ihss),
            rap: RapConfig {
                floor: dec("11903.13"),
                rate: dec("0.015"),
            },
        }
    }

    fn settings() -> EngineSettings {
        EngineSettings {
            schedule: ScheduleConfig {
                days_per_month: dec("30"),
                hours_per_day: dec("8"),
            },
            overtime: OvertimeMultipliers {
                surcharge_25: dec("1.25"),
                surcharge_50: dec("1.50"),
                surcharge_75: dec("1.75"),
                surcharge_100: dec("2.00"),
            },
            timeouts: ServiceTimeouts {
                hours_service_ms: 5000,
                meal_deduction_service_ms: 3000,
            },
        }
    }

    #[test]
    fn test_hours_per_month() {
        let config = PayrollConfig::new(settings(), vec![]);
        assert_eq!(config.schedule().hours_per_month(), dec("240"));
    }

    #[test]
    fn test_statutory_for_picks_latest_effective() {
        let config = PayrollConfig::new(
            settings(),
            vec![rates("2025-01-01", "610.00"), rates("2024-01-01", "595.16")],
        );

        let date = |s: &str| NaiveDate::from_str(s).unwrap();
        assert_eq!(
            config.statutory_for(date("2024-06-11")).unwrap().ihss_fixed,
            dec("595.16")
        );
        assert_eq!(
            config.statutory_for(date("2025-01-11")).unwrap().ihss_fixed,
            dec("610.00")
        );
        assert!(config.statutory_for(date("2023-12-26")).is_none());
    }
}
