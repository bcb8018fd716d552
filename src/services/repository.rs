//! Storage of payroll records.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use crate::calculation::check_overlap;
use crate::error::{EngineError, EngineResult};
use crate::models::PayrollRecord;

/// Outbound port for persisted payroll records.
///
/// Implementations own the guarantee that no two records of the same
/// employee cover overlapping date ranges: `create` and `update` must reject
/// a conflicting record with [`EngineError::PeriodOverlap`] atomically.
#[async_trait]
pub trait PayrollRepository: Send + Sync + 'static {
    /// All records of an employee, newest period first.
    async fn list_by_employee(&self, employee_id: &str) -> EngineResult<Vec<PayrollRecord>>;

    /// Loads one record.
    ///
    /// Returns [`EngineError::RecordNotFound`] if no record has `id`.
    async fn get(&self, id: Uuid) -> EngineResult<PayrollRecord>;

    /// Stores a new record and returns it with its assigned id.
    async fn create(&self, record: PayrollRecord) -> EngineResult<PayrollRecord>;

    /// Replaces the stored record with the same id.
    async fn update(&self, record: PayrollRecord) -> EngineResult<PayrollRecord>;

    /// Removes a record.
    async fn delete(&self, id: Uuid) -> EngineResult<()>;
}

/// Thread-safe in-memory repository.
///
/// The overlap check and the write happen under one write lock, so two
/// concurrent submissions for the same employee cannot both succeed.
#[derive(Clone, Default)]
pub struct InMemoryPayrollRepository {
    records: Arc<RwLock<HashMap<Uuid, PayrollRecord>>>,
}

fn poisoned() -> EngineError {
    EngineError::Repository {
        message: "record store lock poisoned".to_string(),
    }
}

impl InMemoryPayrollRepository {
    /// An empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().map(|records| records.len()).unwrap_or(0)
    }

    /// True if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn employee_records(records: &HashMap<Uuid, PayrollRecord>, employee_id: &str) -> Vec<PayrollRecord> {
    records
        .values()
        .filter(|record| record.employee_id == employee_id)
        .cloned()
        .collect()
}

#[async_trait]
impl PayrollRepository for InMemoryPayrollRepository {
    async fn list_by_employee(&self, employee_id: &str) -> EngineResult<Vec<PayrollRecord>> {
        let records = self.records.read().map_err(|_| poisoned())?;
        let mut found = employee_records(&records, employee_id);
        found.sort_by(|a, b| b.period.start_date.cmp(&a.period.start_date));
        Ok(found)
    }

    async fn get(&self, id: Uuid) -> EngineResult<PayrollRecord> {
        let records = self.records.read().map_err(|_| poisoned())?;
        records
            .get(&id)
            .cloned()
            .ok_or(EngineError::RecordNotFound { record_id: id })
    }

    async fn create(&self, mut record: PayrollRecord) -> EngineResult<PayrollRecord> {
        let mut records = self.records.write().map_err(|_| poisoned())?;

        let existing = employee_records(&records, &record.employee_id);
        check_overlap(&record.employee_id, &record.period, &existing, None)?;

        let id = Uuid::new_v4();
        record.id = Some(id);
        records.insert(id, record.clone());
        Ok(record)
    }

    async fn update(&self, record: PayrollRecord) -> EngineResult<PayrollRecord> {
        let id = record.id.ok_or_else(|| EngineError::Repository {
            message: "cannot update a record without an id".to_string(),
        })?;

        let mut records = self.records.write().map_err(|_| poisoned())?;
        if !records.contains_key(&id) {
            return Err(EngineError::RecordNotFound { record_id: id });
        }

        let existing = employee_records(&records, &record.employee_id);
        check_overlap(&record.employee_id, &record.period, &existing, Some(id))?;

        records.insert(id, record.clone());
        Ok(record)
    }

    async fn delete(&self, id: Uuid) -> EngineResult<()> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        records
            .remove(&id)
            .map(|_| ())
            .ok_or(EngineError::RecordNotFound { record_id: id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::assembler::tests::sample_record;
    use crate::calculation::period_for;
    use crate::models::PayHalf;

    #[tokio::test]
    async fn test_create_assigns_id() {
        let repository = InMemoryPayrollRepository::new();

        let stored = repository.create(sample_record()).await.unwrap();

        let id = stored.id.unwrap();
        assert_eq!(repository.get(id).await.unwrap(), stored);
        assert_eq!(repository.len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_overlap() {
        let repository = InMemoryPayrollRepository::new();
        repository.create(sample_record()).await.unwrap();

        let result = repository.create(sample_record()).await;

        assert!(matches!(result, Err(EngineError::PeriodOverlap { .. })));
        assert_eq!(repository.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_creates_store_one_record() {
        let repository = InMemoryPayrollRepository::new();

        let (a, b) = tokio::join!(
            repository.create(sample_record()),
            repository.create(sample_record())
        );

        assert!(a.is_ok() != b.is_ok());
        assert_eq!(repository.len(), 1);
    }

    #[tokio::test]
    async fn test_list_by_employee_newest_first() {
        let repository = InMemoryPayrollRepository::new();
        let mut earlier = sample_record();
        earlier.period = period_for(2024, 3, PayHalf::A).unwrap();
        repository.create(earlier).await.unwrap();
        repository.create(sample_record()).await.unwrap();

        let mut other = sample_record();
        other.employee_id = "emp_002".to_string();
        repository.create(other).await.unwrap();

        let codes: Vec<String> = repository
            .list_by_employee("emp_001")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.period.code)
            .collect();
        assert_eq!(codes, vec!["202403B", "202403A"]);
    }

    #[tokio::test]
    async fn test_update_can_keep_own_period() {
        let repository = InMemoryPayrollRepository::new();
        let mut stored = repository.create(sample_record()).await.unwrap();

        stored.comment = Some("revisado".to_string());
        let updated = repository.update(stored.clone()).await.unwrap();

        assert_eq!(updated.comment.as_deref(), Some("revisado"));
        assert_eq!(repository.get(stored.id.unwrap()).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_rejects_overlap_with_other_record() {
        let repository = InMemoryPayrollRepository::new();
        let mut first_half = sample_record();
        first_half.period = period_for(2024, 3, PayHalf::A).unwrap();
        let mut stored = repository.create(first_half).await.unwrap();
        repository.create(sample_record()).await.unwrap();

        stored.period = period_for(2024, 3, PayHalf::B).unwrap();

        assert!(matches!(
            repository.update(stored).await,
            Err(EngineError::PeriodOverlap { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_records() {
        let repository = InMemoryPayrollRepository::new();
        let id = Uuid::new_v4();

        assert!(matches!(
            repository.get(id).await,
            Err(EngineError::RecordNotFound { record_id }) if record_id == id
        ));
        assert!(matches!(
            repository.delete(id).await,
            Err(EngineError::RecordNotFound { .. })
        ));

        let mut unsaved = sample_record();
        unsaved.id = Some(id);
        assert!(matches!(
            repository.update(unsaved).await,
            Err(EngineError::RecordNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let repository = InMemoryPayrollRepository::new();
        let stored = repository.create(sample_record()).await.unwrap();

        repository.delete(stored.id.unwrap()).await.unwrap();

        assert!(repository.is_empty());
    }
}
