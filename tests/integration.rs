//! Integration tests for the payroll engine.
//!
//! This test suite drives the engine end to end through its in-memory ports:
//! - Reference second-half computation
//! - First-half deduction regime
//! - Meal deduction from the service and its fallbacks
//! - Overlap and attendance gates
//! - Record lifecycle (submit, update, delete, mark paid)
//! - Idempotence under a fixed clock

use std::str::FromStr;
use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use quincena_payroll::clock::FixedClock;
use quincena_payroll::config::ConfigLoader;
use quincena_payroll::engine::PayrollEngine;
use quincena_payroll::error::{EngineError, ErrorKind};
use quincena_payroll::models::{
    AttendanceGaps, Deduction, HourSummary, MealDeductionSource, MealItem, PayHalf,
    PayrollOverrides, PayrollRequest, PeriodSelector, SalaryProfile,
};
use quincena_payroll::services::{
    InMemoryPayrollRepository, PayrollRepository, StaticHoursService, StaticMealDeductionService,
};

// =============================================================================
// Test Helpers
// =============================================================================

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

struct Harness {
    engine: PayrollEngine,
    repository: InMemoryPayrollRepository,
    meals: StaticMealDeductionService,
}

fn harness_with(hours: StaticHoursService, meals: StaticMealDeductionService) -> Harness {
    let repository = InMemoryPayrollRepository::new();
    let config = ConfigLoader::load("./config/payroll").expect("Failed to load config");
    let engine = PayrollEngine::new(
        config,
        Arc::new(hours),
        Arc::new(meals.clone()),
        Arc::new(repository.clone()),
    )
    .with_clock(FixedClock(Utc.with_ymd_and_hms(2024, 3, 27, 9, 0, 0).unwrap()));

    Harness {
        engine,
        repository,
        meals,
    }
}

fn full_attendance() -> StaticHoursService {
    StaticHoursService::new()
        .with_summary("emp_001", HourSummary::full_period(decimal("15")))
        .with_summary("emp_002", HourSummary::full_period(decimal("15")))
}

fn harness() -> Harness {
    harness_with(full_attendance(), StaticMealDeductionService::new())
}

fn request(salary: &str, selector: PeriodSelector) -> PayrollRequest {
    PayrollRequest {
        salary: SalaryProfile {
            employee_id: "emp_001".to_string(),
            employee_code: Some("E-001".to_string()),
            monthly_salary: decimal(salary),
        },
        period: Some(selector),
        overrides: PayrollOverrides::default(),
    }
}

fn second_half_march() -> PeriodSelector {
    PeriodSelector::Explicit {
        year: 2024,
        month: 3,
        half: PayHalf::B,
    }
}

fn first_half_march() -> PeriodSelector {
    PeriodSelector::Explicit {
        year: 2024,
        month: 3,
        half: PayHalf::A,
    }
}

// =============================================================================
// Computation
// =============================================================================

#[tokio::test]
async fn test_second_half_reference_scenario() {
    let h = harness();

    let record = h
        .engine
        .compute_payroll(&request("15000", second_half_march()))
        .await
        .unwrap();

    assert_eq!(record.period.code, "202403B");
    assert_eq!(record.period.start_date, date(2024, 3, 12));
    assert_eq!(record.period.end_date, date(2024, 3, 26));
    assert_eq!(record.period_name, "Segunda quincena de marzo de 2024");
    assert_eq!(record.half_month_rate, decimal("7500"));
    assert_eq!(record.earnings.worked_days_amount, decimal("7500.00"));
    assert_eq!(record.earnings.subtotal_period, decimal("7500.00"));
    assert_eq!(record.deductions.ihss, Deduction::Editable(decimal("595.16")));
    assert_eq!(record.deductions.rap, Deduction::Editable(decimal("46.45")));
    assert_eq!(record.deductions.meal_deduction, Deduction::Fixed(Decimal::ZERO));
    assert_eq!(record.total_earnings, decimal("7500.00"));
    assert_eq!(record.total_deductions, decimal("641.61"));
    assert_eq!(record.net_pay, decimal("6858.39"));
    assert!(record.is_balanced());
    assert_eq!(record.id, None);
    assert!(h.repository.is_empty());
}

#[tokio::test]
async fn test_reference_scenario_with_meal_consumption() {
    let meals = StaticMealDeductionService::new().with_items(
        "E-001",
        vec![
            MealItem {
                date: date(2024, 3, 13),
                description: "Almuerzo".to_string(),
                amount: decimal("45.50"),
            },
            MealItem {
                date: date(2024, 3, 20),
                description: "Desayuno".to_string(),
                amount: decimal("30.00"),
            },
        ],
    );
    let h = harness_with(full_attendance(), meals);

    let record = h
        .engine
        .compute_payroll(&request("15000", second_half_march()))
        .await
        .unwrap();

    assert_eq!(record.deductions.meal_deduction, Deduction::Fixed(decimal("75.50")));
    assert_eq!(record.total_deductions, decimal("717.11"));
    assert_eq!(record.net_pay, decimal("6782.89"));
    match &record.meal_deduction_source {
        MealDeductionSource::Service { items } => assert_eq!(items.len(), 2),
        other => panic!("Expected service source, got {:?}", other),
    }
}

#[tokio::test]
async fn test_first_half_forces_statutory_deductions_to_zero() {
    let h = harness();
    let mut request = request("20000", first_half_march());
    request.overrides = PayrollOverrides {
        isr: Some(decimal("500")),
        ihss: Some(decimal("595.16")),
        other: Some(decimal("25")),
        adjustment: Some(decimal("-10")),
        ..Default::default()
    };

    let record = h.engine.compute_payroll(&request).await.unwrap();

    assert_eq!(record.period.start_date, date(2024, 2, 27));
    assert_eq!(record.period.end_date, date(2024, 3, 11));
    assert_eq!(record.period_name, "Primera quincena de marzo de 2024");
    for deduction in [
        record.deductions.isr,
        record.deductions.rap,
        record.deductions.ihss,
        record.deductions.loan_collection,
        record.deductions.local_tax,
    ] {
        assert_eq!(deduction, Deduction::Fixed(Decimal::ZERO));
    }
    assert_eq!(record.deductions.other, Deduction::Editable(decimal("25")));
    assert_eq!(record.earnings.adjustment, decimal("-10"));
    assert_eq!(record.total_earnings, decimal("9990.00"));
    assert_eq!(record.net_pay, decimal("9965.00"));

    let ignored: Vec<&str> = record
        .audit_trace
        .warnings
        .iter()
        .filter(|w| w.code == "OVERRIDE_IGNORED")
        .map(|w| w.severity.as_str())
        .collect();
    assert_eq!(ignored, vec!["low", "low"]);
}

#[tokio::test]
async fn test_rap_above_floor_in_second_half() {
    let h = harness();
    let record = h
        .engine
        .compute_payroll(&request("20000", second_half_march()))
        .await
        .unwrap();

    assert_eq!(record.deductions.rap.amount(), decimal("121.45"));
}

#[tokio::test]
async fn test_period_selected_by_date_after_day_26() {
    let h = harness();
    let record = h
        .engine
        .compute_payroll(&request("15000", PeriodSelector::Date(date(2024, 12, 28))))
        .await;

    // Attendance is canned for any range; the period resolves to next January.
    let record = record.unwrap();
    assert_eq!(record.period.code, "202501A");
    assert_eq!(record.period.start_date, date(2024, 12, 27));
    assert_eq!(record.period_name, "Primera quincena de enero de 2025");
}

#[tokio::test]
async fn test_overtime_and_leave_flow_into_totals() {
    let mut summary = HourSummary::full_period(decimal("15"));
    summary.days_worked = decimal("13");
    summary.justified_leave_hours = decimal("8");
    summary.overtime.surcharge_25 = decimal("4");
    summary.overtime.surcharge_100 = decimal("2");
    let hours = StaticHoursService::new().with_summary("emp_001", summary);
    let h = harness_with(hours, StaticMealDeductionService::new());

    let mut request = request("15000", second_half_march());
    request.overrides.insurer_incapacity_amount = Some(decimal("150"));

    let record = h.engine.compute_payroll(&request).await.unwrap();

    // 7500 × 13 / 15 = 6500; 8 h × 62.50 = 500
    assert_eq!(record.earnings.worked_days_amount, decimal("6500.00"));
    assert_eq!(record.earnings.justified_leave_amount, decimal("500.00"));
    assert_eq!(record.earnings.subtotal_period, decimal("7000.00"));
    // 4 × 62.50 × 1.25 = 312.50; 2 × 62.50 × 2 = 250
    assert_eq!(record.earnings.overtime.surcharge_25, decimal("312.50"));
    assert_eq!(record.earnings.overtime.surcharge_100, decimal("250.00"));
    assert_eq!(record.total_earnings, decimal("7712.50"));
    assert!(record.is_balanced());
}

#[tokio::test]
async fn test_record_serializes_deduction_modes() {
    let h = harness();
    let record = h
        .engine
        .compute_payroll(&request("15000", first_half_march()))
        .await
        .unwrap();

    let json: Value = serde_json::to_value(&record).unwrap();

    assert_eq!(json["deductions"]["isr"]["mode"], "fixed");
    assert_eq!(json["deductions"]["other"]["mode"], "editable");
    assert_eq!(json["net_pay"], "7500.00");
    assert_eq!(json["period"]["code"], "202403A");
    assert_eq!(json["meal_deduction_source"]["source"], "service");
}

// =============================================================================
// Meal deduction fallback
// =============================================================================

#[tokio::test]
async fn test_meal_service_failure_falls_back_to_override() {
    let meals = StaticMealDeductionService::new().failing("503 Service Unavailable");
    let h = harness_with(full_attendance(), meals);
    let mut request = request("15000", second_half_march());
    request.overrides.meal_deduction = Some(decimal("80"));

    let record = h.engine.compute_payroll(&request).await.unwrap();

    assert_eq!(record.deductions.meal_deduction, Deduction::Editable(decimal("80")));
    match &record.meal_deduction_source {
        MealDeductionSource::Fallback { message } => {
            assert!(message.contains("503 Service Unavailable"));
        }
        other => panic!("Expected fallback, got {:?}", other),
    }
    assert_eq!(record.net_pay, decimal("6778.39"));
}

#[tokio::test]
async fn test_meal_service_rejection_shows_message() {
    let meals = StaticMealDeductionService::new().rejecting("E-001", "empleado sin registro");
    let h = harness_with(full_attendance(), meals);

    let record = h
        .engine
        .compute_payroll(&request("15000", second_half_march()))
        .await
        .unwrap();

    assert_eq!(record.deductions.meal_deduction, Deduction::Editable(Decimal::ZERO));
    assert_eq!(
        record.meal_deduction_source,
        MealDeductionSource::Fallback {
            message: "empleado sin registro".to_string()
        }
    );
}

#[tokio::test]
async fn test_meal_service_timeout_is_not_fatal() {
    let meals = StaticMealDeductionService::new().with_delay(std::time::Duration::from_secs(60));
    let h = harness_with(full_attendance(), meals);

    tokio::time::pause();
    let record = h
        .engine
        .compute_payroll(&request("15000", second_half_march()))
        .await
        .unwrap();

    assert!(record.deductions.meal_deduction.is_editable());
    assert_eq!(h.meals.call_count(), 1);
}

// =============================================================================
// Validation gates
// =============================================================================

#[tokio::test]
async fn test_overlapping_period_rejected() {
    let h = harness();
    h.engine
        .submit_payroll(&request("15000", second_half_march()))
        .await
        .unwrap();

    // A range straddling the stored 2024-03-12..2024-03-26 record.
    let result = h
        .engine
        .compute_payroll(&request("15000", PeriodSelector::Date(date(2024, 3, 20))))
        .await;

    match result {
        Err(err @ EngineError::PeriodOverlap { .. }) => {
            assert_eq!(err.kind(), ErrorKind::Validation);
            assert!(err.to_string().contains("202403B"));
        }
        other => panic!("Expected PeriodOverlap, got {:?}", other),
    }
}

#[tokio::test]
async fn test_other_employee_may_use_same_period() {
    let h = harness();
    h.engine
        .submit_payroll(&request("15000", second_half_march()))
        .await
        .unwrap();

    let mut other = request("18000", second_half_march());
    other.salary.employee_id = "emp_002".to_string();
    other.salary.employee_code = Some("E-002".to_string());

    assert!(h.engine.submit_payroll(&other).await.is_ok());
    assert_eq!(h.repository.len(), 2);
}

#[tokio::test]
async fn test_incomplete_attendance_returns_dates() {
    let hours = StaticHoursService::new().with_gaps(
        "emp_001",
        AttendanceGaps {
            missing_dates: vec![date(2024, 3, 18)],
            unapproved_dates: vec![date(2024, 3, 21)],
        },
    );
    let h = harness_with(hours, StaticMealDeductionService::new());

    let result = h
        .engine
        .submit_payroll(&request("15000", second_half_march()))
        .await;

    match result {
        Err(EngineError::AttendanceIncomplete {
            employee_id,
            missing_dates,
            unapproved_dates,
        }) => {
            assert_eq!(employee_id, "emp_001");
            assert_eq!(missing_dates, vec![date(2024, 3, 18)]);
            assert_eq!(unapproved_dates, vec![date(2024, 3, 21)]);
        }
        other => panic!("Expected AttendanceIncomplete, got {:?}", other),
    }
    assert!(h.repository.is_empty());
}

#[tokio::test]
async fn test_hours_service_failure_is_terminal() {
    let hours = StaticHoursService::new().failing("connection reset");
    let h = harness_with(hours, StaticMealDeductionService::new());

    let err = h
        .engine
        .compute_payroll(&request("15000", second_half_march()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Service);
    assert_eq!(h.meals.call_count(), 0);
}

#[tokio::test]
async fn test_invalid_inputs_rejected() {
    let h = harness();

    let mut negative = request("15000", second_half_march());
    negative.overrides.loan_collection = Some(decimal("-5"));
    match h.engine.compute_payroll(&negative).await {
        Err(EngineError::InvalidField { field, .. }) => assert_eq!(field, "loan_collection"),
        other => panic!("Expected InvalidField, got {:?}", other),
    }

    let mut long_comment = request("15000", second_half_march());
    long_comment.overrides.comment = Some("x".repeat(201));
    match h.engine.compute_payroll(&long_comment).await {
        Err(EngineError::InvalidField { field, .. }) => assert_eq!(field, "comment"),
        other => panic!("Expected InvalidField, got {:?}", other),
    }

    let bad_month = request(
        "15000",
        PeriodSelector::Explicit {
            year: 2024,
            month: 13,
            half: PayHalf::A,
        },
    );
    assert!(matches!(
        h.engine.compute_payroll(&bad_month).await,
        Err(EngineError::InvalidPeriod { .. })
    ));
}

#[tokio::test]
async fn test_zero_period_days_rejected() {
    let mut summary = HourSummary::full_period(decimal("15"));
    summary.period_total_days = Decimal::ZERO;
    let hours = StaticHoursService::new().with_summary("emp_001", summary);
    let h = harness_with(hours, StaticMealDeductionService::new());

    match h
        .engine
        .compute_payroll(&request("15000", second_half_march()))
        .await
    {
        Err(EngineError::InvalidField { field, .. }) => assert_eq!(field, "period_total_days"),
        other => panic!("Expected InvalidField, got {:?}", other),
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn test_submit_then_update_keeps_identity() {
    let h = harness();
    let stored = h
        .engine
        .submit_payroll(&request("15000", second_half_march()))
        .await
        .unwrap();
    let id = stored.id.unwrap();

    let mut edited = request("15000", second_half_march());
    edited.overrides.isr = Some(decimal("250"));
    edited.overrides.comment = Some("ISR ajustado".to_string());

    let updated = h.engine.update_payroll(id, &edited).await.unwrap();

    assert_eq!(updated.id, Some(id));
    assert_eq!(updated.created_at, stored.created_at);
    assert_eq!(updated.deductions.isr, Deduction::Editable(decimal("250")));
    assert_eq!(updated.net_pay, decimal("6608.39"));
    assert_eq!(updated.comment.as_deref(), Some("ISR ajustado"));
    assert_eq!(h.repository.get(id).await.unwrap(), updated);
}

#[tokio::test]
async fn test_paid_record_is_immutable() {
    let h = harness();
    let stored = h
        .engine
        .submit_payroll(&request("15000", second_half_march()))
        .await
        .unwrap();
    let id = stored.id.unwrap();

    let paid = h.engine.mark_paid(id).await.unwrap();
    assert!(paid.paid);
    assert!(h.engine.mark_paid(id).await.unwrap().paid);

    let update = h
        .engine
        .update_payroll(id, &request("15000", second_half_march()))
        .await;
    match update {
        Err(err @ EngineError::RecordPaid { .. }) => {
            assert_eq!(err.kind(), ErrorKind::Immutability);
        }
        other => panic!("Expected RecordPaid, got {:?}", other),
    }

    assert!(matches!(
        h.engine.delete_payroll(id).await,
        Err(EngineError::RecordPaid { record_id }) if record_id == id
    ));
    assert_eq!(h.repository.len(), 1);
}

#[tokio::test]
async fn test_delete_frees_the_period() {
    let h = harness();
    let stored = h
        .engine
        .submit_payroll(&request("15000", second_half_march()))
        .await
        .unwrap();

    h.engine.delete_payroll(stored.id.unwrap()).await.unwrap();

    assert!(h.repository.is_empty());
    assert!(
        h.engine
            .submit_payroll(&request("15000", second_half_march()))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_update_for_another_employee_rejected() {
    let h = harness();
    let stored = h
        .engine
        .submit_payroll(&request("15000", second_half_march()))
        .await
        .unwrap();

    let mut other = request("15000", second_half_march());
    other.salary.employee_id = "emp_002".to_string();

    match h.engine.update_payroll(stored.id.unwrap(), &other).await {
        Err(EngineError::InvalidField { field, .. }) => assert_eq!(field, "employee_id"),
        other => panic!("Expected InvalidField, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_record_not_found() {
    let h = harness();
    let id = uuid::Uuid::new_v4();
    assert!(matches!(
        h.engine.mark_paid(id).await,
        Err(EngineError::RecordNotFound { .. })
    ));
}

// =============================================================================
// Idempotence
// =============================================================================

#[tokio::test]
async fn test_identical_requests_produce_identical_records() {
    let h = harness();
    let request = request("15000", second_half_march());

    let first = h.engine.compute_payroll(&request).await.unwrap();
    let second = h.engine.compute_payroll(&request).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}
