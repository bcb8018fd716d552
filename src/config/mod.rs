//! Configuration loading and management for the payroll engine.
//!
//! This module loads the engine settings (working-time divisors, overtime
//! multipliers, service timeouts) and the effective-dated statutory deduction
//! constants from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use quincena_payroll::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/payroll").unwrap();
//! println!("Hours per month: {}", loader.config().schedule().hours_per_month());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    EngineSettings, OvertimeMultipliers, PayrollConfig, RapConfig, ScheduleConfig,
    ServiceTimeouts, StatutoryRates,
};
