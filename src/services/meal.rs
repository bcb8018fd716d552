//! Cafeteria consumption from the meal deduction service.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult, ServiceName};
use crate::models::MealItem;

/// The meal deduction service's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MealLookup {
    /// The amount to deduct for the range, with its detail.
    Found {
        /// Total to deduct.
        amount: Decimal,
        /// Itemized consumption.
        items: Vec<MealItem>,
    },
    /// The service answered but had no value for this employee.
    Rejected {
        /// The service's explanation.
        message: String,
    },
}

/// Outbound port for meal deductions, keyed by the employee's code.
#[async_trait]
pub trait MealDeductionService: Send + Sync + 'static {
    /// Looks up the meal deduction for `start..=end`.
    async fn meal_deduction(
        &self,
        employee_code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<MealLookup>;
}

/// In-memory meal deduction service.
///
/// Codes without canned items have no consumption and are answered with a
/// zero amount. Items are filtered to the requested range and summed.
#[derive(Clone, Default)]
pub struct StaticMealDeductionService {
    items: Arc<HashMap<String, Vec<MealItem>>>,
    rejections: Arc<HashMap<String, String>>,
    failure: Option<String>,
    delay: Option<Duration>,
    call_count: Arc<AtomicUsize>,
}

impl StaticMealDeductionService {
    /// An empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records consumption for `employee_code`.
    pub fn with_items(mut self, employee_code: &str, items: Vec<MealItem>) -> Self {
        Arc::make_mut(&mut self.items)
            .entry(employee_code.to_string())
            .or_default()
            .extend(items);
        self
    }

    /// Rejects lookups for `employee_code` with `message`.
    pub fn rejecting(mut self, employee_code: &str, message: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.rejections).insert(employee_code.to_string(), message.into());
        self
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

    /// Number of `meal_deduction` calls made so far.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MealDeductionService for StaticMealDeductionService {
    async fn meal_deduction(
        &self,
        employee_code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<MealLookup> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = &self.failure {
            return Err(EngineError::ServiceFailure {
                service: ServiceName::MealDeductionService,
                message: message.clone(),
            });
        }

        if let Some(message) = self.rejections.get(employee_code) {
            return Ok(MealLookup::Rejected {
                message: message.clone(),
            });
        }

        let items: Vec<MealItem> = self
            .items
            .get(employee_code)
            .map(|items| {
                items
                    .iter()
                    .filter(|item| item.date >= start && item.date <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        let amount = items.iter().map(|item| item.amount).sum();

        Ok(MealLookup::Found { amount, items })
    }
}
