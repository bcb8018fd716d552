//! The payroll engine: orchestrates the calculation pipeline around the
//! outbound ports and manages the record lifecycle.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::calculation::{
    MealDeductionOutcome, RecordParts, assemble_record, check_attendance, check_overlap,
    collect_earnings, prorate_period, resolve_deductions, resolve_meal_deduction, resolve_period,
    salary_rates, selectable_periods, value_overtime,
};
use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigLoader, PayrollConfig};
use crate::error::{EngineError, EngineResult, ServiceName};
use crate::models::{
    AuditStep, AuditTrace, HourSummary, PayPeriod, PayrollRecord, PayrollRequest, PeriodSelector,
    SalaryProfile,
};
use crate::services::{
    HoursLookup, HoursService, MealDeductionService, MealLookup, PayrollRepository,
};

/// Computes payroll records and moves them through their lifecycle.
///
/// One engine can serve any number of requests; it holds no per-request
/// state.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use quincena_payroll::config::ConfigLoader;
/// use quincena_payroll::engine::PayrollEngine;
/// use quincena_payroll::models::{HourSummary, PayrollRequest, PeriodSelector, SalaryProfile};
/// use quincena_payroll::services::{
///     InMemoryPayrollRepository, StaticHoursService, StaticMealDeductionService,
/// };
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// # async fn run() -> quincena_payroll::error::EngineResult<()> {
/// let engine = PayrollEngine::new(
///     ConfigLoader::load("./config/payroll")?,
///     Arc::new(StaticHoursService::new()
///         .with_summary("emp_001", HourSummary::full_period(Decimal::new(15, 0)))),
///     Arc::new(StaticMealDeductionService::new()),
///     Arc::new(InMemoryPayrollRepository::new()),
/// );
///
/// let request = PayrollRequest {
///     salary: SalaryProfile {
///         employee_id: "emp_001".to_string(),
///         employee_code: Some("E-001".to_string()),
///         monthly_salary: Decimal::new(15000, 0),
///     },
///     period: Some(PeriodSelector::Date(NaiveDate::from_ymd_opt(2024, 3, 20).unwrap())),
///     overrides: Default::default(),
/// };
///
/// let record = engine.submit_payroll(&request).await?;
/// println!("{} net pay: {}", record.period_name, record.net_pay);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PayrollEngine {
    config: Arc<ConfigLoader>,
    hours: Arc<dyn HoursService>,
    meals: Arc<dyn MealDeductionService>,
    repository: Arc<dyn PayrollRepository>,
    clock: Arc<dyn Clock>,
}

async fn with_timeout<T, F>(service: ServiceName, limit_ms: u64, call: F) -> EngineResult<T>
where
    F: Future<Output = EngineResult<T>>,
{
    match tokio::time::timeout(Duration::from_millis(limit_ms), call).await {
        Ok(result) => result,
        Err(_) => Err(EngineError::ServiceFailure {
            service,
            message: format!("timed out after {} ms", limit_ms),
        }),
    }
}

impl PayrollEngine {
    /// Creates an engine that stamps records with the system clock.
    pub fn new(
        config: ConfigLoader,
        hours: Arc<dyn HoursService>,
        meals: Arc<dyn MealDeductionService>,
        repository: Arc<dyn PayrollRepository>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            hours,
            meals,
            repository,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock.
    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// The loaded configuration.
    pub fn config(&self) -> &PayrollConfig {
        self.config.config()
    }

    /// The most recent `count` periods a caller may pick today, newest first.
    pub fn selectable_periods(&self, count: usize) -> Vec<PayPeriod> {
        selectable_periods(self.clock.now().date_naive(), count)
    }

    /// Computes a payroll record without storing it.
    ///
    /// Identical requests against identical service answers and a fixed
    /// clock produce identical records.
    ///
    /// # Errors
    ///
    /// - Validation errors for a missing or invalid period, invalid amounts,
    ///   overlap with a stored record, or incomplete attendance
    /// - `ServiceFailure` if the hours service fails or times out
    /// - `ConfigNotFound` if no statutory rates cover the period
    pub async fn compute_payroll(&self, request: &PayrollRequest) -> EngineResult<PayrollRecord> {
        let correlation_id = Uuid::new_v4();
        self.compute_logged(request, None, correlation_id).await
    }

    /// Computes a record and stores it.
    ///
    /// The repository repeats the overlap check atomically; a conflict
    /// there surfaces as the same `PeriodOverlap` error.
    pub async fn submit_payroll(&self, request: &PayrollRequest) -> EngineResult<PayrollRecord> {
        let correlation_id = Uuid::new_v4();
        let record = self.compute_logged(request, None, correlation_id).await?;

        let stored = self.repository.create(record).await.inspect_err(|err| {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Failed to store payroll record"
            );
        })?;

        info!(
            correlation_id = %correlation_id,
            record_id = ?stored.id,
            period = %stored.period.code,
            "Payroll record stored"
        );
        Ok(stored)
    }

    /// Recomputes a stored record from a new request and replaces it.
    ///
    /// The record keeps its id and original `created_at`, and is excluded
    /// from its own overlap check.
    ///
    /// # Errors
    ///
    /// - `RecordNotFound` if `id` is unknown
    /// - `RecordPaid` if the record has been paid
    /// - `InvalidField("employee_id")` if the request is for another employee
    /// - Any error of [`compute_payroll`](Self::compute_payroll)
    pub async fn update_payroll(
        &self,
        id: Uuid,
        request: &PayrollRequest,
    ) -> EngineResult<PayrollRecord> {
        let correlation_id = Uuid::new_v4();
        let existing = self.repository.get(id).await?;

        if existing.paid {
            warn!(correlation_id = %correlation_id, record_id = %id, "Refusing to edit a paid record");
            return Err(EngineError::RecordPaid { record_id: id });
        }
        if existing.employee_id != request.salary.employee_id {
            return Err(EngineError::invalid_field(
                "employee_id",
                format!(
                    "record {} belongs to '{}', not '{}'",
                    id, existing.employee_id, request.salary.employee_id
                ),
            ));
        }

        let mut record = self
            .compute_logged(request, Some(id), correlation_id)
            .await?;
        record.id = Some(id);
        record.created_at = existing.created_at;

        let stored = self.repository.update(record).await?;
        info!(correlation_id = %correlation_id, record_id = %id, "Payroll record updated");
        Ok(stored)
    }

    /// Deletes an unpaid record.
    pub async fn delete_payroll(&self, id: Uuid) -> EngineResult<()> {
        let existing = self.repository.get(id).await?;
        if existing.paid {
            warn!(record_id = %id, "Refusing to delete a paid record");
            return Err(EngineError::RecordPaid { record_id: id });
        }

        self.repository.delete(id).await?;
        info!(record_id = %id, period = %existing.period.code, "Payroll record deleted");
        Ok(())
    }

    /// Marks a record as paid. Paid records can no longer be edited or
    /// deleted; marking one twice is a no-op.
    pub async fn mark_paid(&self, id: Uuid) -> EngineResult<PayrollRecord> {
        let mut record = self.repository.get(id).await?;
        if record.paid {
            debug!(record_id = %id, "Record already paid");
            return Ok(record);
        }

        record.paid = true;
        let stored = self.repository.update(record).await?;
        info!(record_id = %id, net_pay = %stored.net_pay, "Payroll record marked paid");
        Ok(stored)
    }

    async fn compute_logged(
        &self,
        request: &PayrollRequest,
        exclude: Option<Uuid>,
        correlation_id: Uuid,
    ) -> EngineResult<PayrollRecord> {
        info!(
            correlation_id = %correlation_id,
            employee_id = %request.salary.employee_id,
            "Processing payroll request"
        );

        let start_time = Instant::now();
        match self.compute(request, exclude, correlation_id).await {
            Ok(record) => {
                info!(
                    correlation_id = %correlation_id,
                    employee_id = %record.employee_id,
                    period = %record.period.code,
                    net_pay = %record.net_pay,
                    warnings = record.audit_trace.warnings.len(),
                    duration_us = start_time.elapsed().as_micros(),
                    "Payroll computed successfully"
                );
                Ok(record)
            }
            Err(err) => {
                warn!(
                    correlation_id = %correlation_id,
                    error = %err,
                    "Payroll computation failed"
                );
                Err(err)
            }
        }
    }

    async fn compute(
        &self,
        request: &PayrollRequest,
        exclude: Option<Uuid>,
        correlation_id: Uuid,
    ) -> EngineResult<PayrollRecord> {
        let profile = &request.salary;
        let overrides = &request.overrides;
        let config = self.config.config();

        // Period
        let selector = request
            .period
            .as_ref()
            .ok_or_else(|| EngineError::invalid_field("period", "a pay period must be selected"))?;
        let period = resolve_period(selector)?;
        debug!(correlation_id = %correlation_id, period = %period, "Resolved pay period");

        // Inputs
        validate_profile(profile)?;
        overrides.validate()?;
        let rates = salary_rates(profile, config.schedule())?;
        let statutory = self.config.statutory_rates(period.end_date)?;

        // Overlap (fast-fail; the repository enforces it again on write)
        let existing = self.repository.list_by_employee(&profile.employee_id).await?;
        check_overlap(&profile.employee_id, &period, &existing, exclude)?;

        // Attendance
        let hours = self.fetch_hours(&profile.employee_id, &period).await?;
        hours.validate()?;

        let mut trace = AuditTrace::default();
        trace.steps.push(period_step(selector, &period));

        let proration = prorate_period(
            &rates,
            &hours,
            config.schedule(),
            overrides.company_incapacity_amount,
            next_step(&trace),
        )?;
        trace.steps.push(proration.audit_step.clone());

        let overtime = value_overtime(
            rates.hourly_rate,
            &hours,
            config.schedule(),
            config.overtime(),
            next_step(&trace),
        );
        trace.steps.push(overtime.audit_step.clone());

        let meal_outcome = self.fetch_meal_deduction(profile, &period, correlation_id).await;
        let meal = resolve_meal_deduction(meal_outcome, next_step(&trace));
        trace.steps.push(meal.audit_step);
        trace.warnings.extend(meal.warning);

        let deductions = resolve_deductions(
            period.half,
            rates.monthly_salary,
            statutory,
            meal.deduction,
            overrides,
            next_step(&trace),
        );
        trace.steps.push(deductions.audit_step);
        trace.warnings.extend(deductions.warnings);

        let earnings = collect_earnings(
            &proration,
            &overtime,
            overrides.insurer_incapacity_amount,
            overrides.adjustment,
        );

        Ok(assemble_record(RecordParts {
            employee_id: profile.employee_id.clone(),
            period,
            rates,
            hours,
            earnings,
            deductions: deductions.deductions,
            meal_deduction_source: meal.source,
            comment: overrides.comment.clone(),
            audit_trace: trace,
            created_at: self.clock.now(),
        }))
    }

    async fn fetch_hours(&self, employee_id: &str, period: &PayPeriod) -> EngineResult<HourSummary> {
        let lookup = with_timeout(
            ServiceName::HoursService,
            self.config().timeouts().hours_service_ms,
            self.hours
                .hour_summary(employee_id, period.start_date, period.end_date),
        )
        .await?;

        match lookup {
            HoursLookup::Complete(summary) => Ok(summary),
            HoursLookup::Incomplete(gaps) => {
                check_attendance(employee_id, &gaps)?;
                Err(EngineError::ServiceFailure {
                    service: ServiceName::HoursService,
                    message: "reported incomplete attendance without any dates".to_string(),
                })
            }
        }
    }

    /// Never fails: any problem degrades to an editable meal deduction.
    async fn fetch_meal_deduction(
        &self,
        profile: &SalaryProfile,
        period: &PayPeriod,
        correlation_id: Uuid,
    ) -> MealDeductionOutcome {
        let Some(code) = profile.employee_code.as_deref().filter(|c| !c.trim().is_empty()) else {
            return MealDeductionOutcome::Unavailable {
                message: format!(
                    "employee '{}' has no employee code; the meal deduction must be entered manually",
                    profile.employee_id
                ),
            };
        };

        let lookup = with_timeout(
            ServiceName::MealDeductionService,
            self.config().timeouts().meal_deduction_service_ms,
            self.meals
                .meal_deduction(code, period.start_date, period.end_date),
        )
        .await;

        match lookup {
            Ok(MealLookup::Found { amount, items }) => MealDeductionOutcome::Found { amount, items },
            Ok(MealLookup::Rejected { message }) => {
                debug!(correlation_id = %correlation_id, message = %message, "Meal deduction rejected");
                MealDeductionOutcome::Unavailable { message }
            }
            Err(err) => {
                warn!(
                    correlation_id = %correlation_id,
                    error = %err,
                    "Meal deduction service unavailable, falling back to manual entry"
                );
                MealDeductionOutcome::Unavailable {
                    message: err.to_string(),
                }
            }
        }
    }
}

fn validate_profile(profile: &SalaryProfile) -> EngineResult<()> {
    if profile.employee_id.trim().is_empty() {
        return Err(EngineError::invalid_field("employee_id", "must not be empty"));
    }
    Ok(())
}

fn next_step(trace: &AuditTrace) -> u32 {
    trace.steps.len() as u32 + 1
}

fn period_step(selector: &PeriodSelector, period: &PayPeriod) -> AuditStep {
    AuditStep {
        step_number: 1,
        rule_id: "period_resolution".to_string(),
        rule_name: "Period Resolution".to_string(),
        input: serde_json::to_value(selector).unwrap_or(serde_json::Value::Null),
        output: serde_json::json!({
            "code": period.code,
            "start_date": period.start_date.to_string(),
            "end_date": period.end_date.to_string(),
            "days": period.len_days()
        }),
        reasoning: format!(
            "Half {} runs {} through {} ({} days)",
            period.half,
            period.start_date,
            period.end_date,
            period.len_days()
        ),
    }
}
