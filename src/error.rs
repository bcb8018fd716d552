//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while computing or storing a
//! payroll record.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The external collaborators the engine talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceName {
    /// Attendance summaries.
    HoursService,
    /// Cafeteria/meal deductions.
    MealDeductionService,
    /// Persisted payroll records.
    PayrollRepository,
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServiceName::HoursService => "hours service",
            ServiceName::MealDeductionService => "meal deduction service",
            ServiceName::PayrollRepository => "payroll repository",
        };
        f.write_str(name)
    }
}

/// Broad classification of an [`EngineError`], used by callers to decide
/// whether the request can be corrected and resubmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller input must be corrected.
    Validation,
    /// An external dependency failed.
    Service,
    /// The record is paid and can no longer change.
    Immutability,
    /// Lookup misses, storage and configuration problems.
    Internal,
}

/// The main error type for the payroll engine.
///
/// # Example
///
/// ```
/// use quincena_payroll::error::EngineError;
///
/// let error = EngineError::InvalidField {
///     field: "isr".to_string(),
///     message: "must not be negative".to_string(),
/// };
/// assert_eq!(error.to_string(), "Invalid field 'isr': must not be negative");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// An input field failed validation.
    #[error("Invalid field '{field}': {message}")]
    InvalidField {
        /// The name of the offending field.
        field: String,
        /// What made the value invalid.
        message: String,
    },

    /// The pay period selection was missing or could not be resolved.
    #[error("Invalid pay period: {message}")]
    InvalidPeriod {
        /// A description of the problem.
        message: String,
    },

    /// Attendance for the period is not fully registered and approved.
    #[error(
        "Attendance incomplete for employee '{employee_id}': {} missing, {} unapproved",
        missing_dates.len(),
        unapproved_dates.len()
    )]
    AttendanceIncomplete {
        /// The employee whose attendance is incomplete.
        employee_id: String,
        /// Dates without any registered attendance.
        missing_dates: Vec<NaiveDate>,
        /// Dates registered but not yet approved by a supervisor.
        unapproved_dates: Vec<NaiveDate>,
    },

    /// The requested range overlaps a payroll record already stored.
    #[error(
        "Period {start_date}..{end_date} overlaps existing payroll '{existing_code}' for employee '{employee_id}'"
    )]
    PeriodOverlap {
        /// The employee the records belong to.
        employee_id: String,
        /// Start of the requested period.
        start_date: NaiveDate,
        /// End of the requested period.
        end_date: NaiveDate,
        /// Period code of the conflicting record.
        existing_code: String,
    },

    /// An external dependency failed, timed out or returned malformed data.
    #[error("{service} failed: {message}")]
    ServiceFailure {
        /// The failing collaborator.
        service: ServiceName,
        /// The raw failure message.
        message: String,
    },

    /// The record has been paid and can no longer be edited or deleted.
    #[error("Payroll record {record_id} is already paid")]
    RecordPaid {
        /// The paid record.
        record_id: Uuid,
    },

    /// No payroll record exists with the given id.
    #[error("Payroll record not found: {record_id}")]
    RecordNotFound {
        /// The missing record.
        record_id: Uuid,
    },

    /// The repository rejected an operation for a reason other than overlap.
    #[error("Repository error: {message}")]
    Repository {
        /// A description of the storage problem.
        message: String,
    },
}

impl EngineError {
    /// Returns the broad classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::InvalidField { .. }
            | EngineError::InvalidPeriod { .. }
            | EngineError::AttendanceIncomplete { .. }
            | EngineError::PeriodOverlap { .. } => ErrorKind::Validation,
            EngineError::ServiceFailure { .. } => ErrorKind::Service,
            EngineError::RecordPaid { .. } => ErrorKind::Immutability,
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::RecordNotFound { .. }
            | EngineError::Repository { .. } => ErrorKind::Internal,
        }
    }

    pub(crate) fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        EngineError::InvalidField {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/engine.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/engine.yaml"
        );
        assert_eq!(error.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_attendance_incomplete_counts_dates() {
        let error = EngineError::AttendanceIncomplete {
            employee_id: "emp_001".to_string(),
            missing_dates: vec![NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()],
            unapproved_dates: vec![
                NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 18).unwrap(),
            ],
        };
        assert_eq!(
            error.to_string(),
            "Attendance incomplete for employee 'emp_001': 1 missing, 2 unapproved"
        );
        assert_eq!(error.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_period_overlap_displays_range_and_code() {
        let error = EngineError::PeriodOverlap {
            employee_id: "emp_001".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 4, 3).unwrap(),
            existing_code: "202403B".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Period 2024-03-20..2024-04-03 overlaps existing payroll '202403B' for employee 'emp_001'"
        );
        assert_eq!(error.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_service_failure_names_service() {
        let error = EngineError::ServiceFailure {
            service: ServiceName::HoursService,
            message: "connection refused".to_string(),
        };
        assert_eq!(error.to_string(), "hours service failed: connection refused");
        assert_eq!(error.kind(), ErrorKind::Service);
    }

    #[test]
    fn test_record_paid_is_immutability_error() {
        let error = EngineError::RecordPaid {
            record_id: Uuid::nil(),
        };
        assert_eq!(error.kind(), ErrorKind::Immutability);
        assert!(error.to_string().contains("already paid"));
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_invalid_field() -> EngineResult<()> {
            Err(EngineError::invalid_field("comment", "too long"))
        }

        fn propagates_error() -> EngineResult<()> {
            returns_invalid_field()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
