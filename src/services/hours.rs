//! Attendance summaries from the hours service.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult, ServiceName};
use crate::models::{AttendanceGaps, HourSummary};

/// The hours service's answer for one employee and date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HoursLookup {
    /// Every date is registered and approved.
    Complete(HourSummary),
    /// Some dates are missing or awaiting approval.
    Incomplete(AttendanceGaps),
}

/// Outbound port for categorized attendance.
///
/// Implementations aggregate the employee's approved attendance over the
/// inclusive range `start..=end`; the engine performs no aggregation itself.
#[async_trait]
pub trait HoursService: Send + Sync + 'static {
    /// Returns the hour summary, or the dates that keep it from being final.
    ///
    /// Transport and upstream errors are returned as
    /// [`EngineError::ServiceFailure`].
    async fn hour_summary(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<HoursLookup>;
}

/// In-memory hours service with canned answers per employee.
///
/// Employees without a canned answer have no attendance at all, so every
/// date of the requested range is reported missing.
///
/// # Examples
///
/// ```
/// use quincena_payroll::models::HourSummary;
/// use quincena_payroll::services::StaticHoursService;
/// use rust_decimal::Decimal;
///
/// let hours = StaticHoursService::new()
///     .with_summary("emp_001", HourSummary::full_period(Decimal::new(15, 0)));
/// assert_eq!(hours.call_count(), 0);
/// ```
#[derive(Clone, Default)]
pub struct StaticHoursService {
    answers: Arc<HashMap<String, HoursLookup>>,
    failure: Option<String>,
    delay: Option<Duration>,
    call_count: Arc<AtomicUsize>,
}

impl StaticHoursService {
    /// An empty service.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_answer(mut self, employee_id: &str, answer: HoursLookup) -> Self {
        Arc::make_mut(&mut self.answers).insert(employee_id.to_string(), answer);
        self
    }

    /// Answers with a complete summary for `employee_id`.
    pub fn with_summary(self, employee_id: &str, summary: HourSummary) -> Self {
        self.with_answer(employee_id, HoursLookup::Complete(summary))
    }

    /// Answers with attendance gaps for `employee_id`.
    pub fn with_gaps(self, employee_id: &str, gaps: AttendanceGaps) -> Self {
        self.with_answer(employee_id, HoursLookup::Incomplete(gaps))
    }

    /// Fails every call with `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Sleeps before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `hour_summary` calls made so far.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HoursService for StaticHoursService {
    async fn hour_summary(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<HoursLookup> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = &self.failure {
            return Err(EngineError::ServiceFailure {
                service: ServiceName::HoursService,
                message: message.clone(),
            });
        }

        let answer = self.answers.get(employee_id).cloned().unwrap_or_else(|| {
            HoursLookup::Incomplete(AttendanceGaps {
                missing_dates: start.iter_days().take_while(|d| *d <= end).collect(),
                unapproved_dates: Vec::new(),
            })
        });
        Ok(answer)
    }
}
