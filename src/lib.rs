//! Payroll engine for bi-weekly ("quincena") pay periods.
//!
//! This crate turns an employee's approved attendance summary for a fixed
//! half-month period into an itemized payroll record: period resolution with
//! asymmetric month boundaries, salary proration, tiered overtime, and
//! deduction regimes that differ by half of the month. Attendance, meal
//! deductions and storage are reached through async ports in [`services`].

#![warn(missing_docs)]

pub mod calculation;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod services;
