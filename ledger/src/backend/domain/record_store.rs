//! The record store: sole owner of the ledger.
//!
//! The ledger is an ordered sequence of [`ExpenseRecord`]s kept in insertion
//! order. Records can be addressed by storage position or by their stable id.
//! Every successful mutation is reported synchronously to the registered
//! [`LedgerObserver`]s (persistence, in practice) before the call returns, so a
//! second mutation can never start while the previous save is in flight.
//!
//! Observer failures are logged and remembered but never roll back the
//! in-memory change.

use anyhow::Result;
use log::{debug, error, info, warn};
use shared::ExpenseForm;

use crate::backend::domain::error::LedgerError;
use crate::backend::domain::models::{ExpenseDetails, ExpenseRecord};
use crate::backend::domain::validation::ExpenseValidator;

/// Hook invoked after every mutation with the full, updated ledger
pub trait LedgerObserver: Send + Sync {
    fn ledger_changed(&self, ledger: &[ExpenseRecord]) -> Result<()>;
}

pub struct RecordStore {
    records: Vec<ExpenseRecord>,
    validator: ExpenseValidator,
    observers: Vec<Box<dyn LedgerObserver>>,
    last_persist_failed: bool,
}

impl RecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Create a store seeded with previously loaded records
    pub fn with_records(records: Vec<ExpenseRecord>) -> Self {
        Self {
            records,
            validator: ExpenseValidator::new(),
            observers: Vec::new(),
            last_persist_failed: false,
        }
    }

    pub fn register_observer(&mut self, observer: Box<dyn LedgerObserver>) {
        self.observers.push(observer);
    }

    /// The full ledger in storage order
    pub fn all(&self) -> &[ExpenseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&ExpenseRecord> {
        self.records.get(position)
    }

    pub fn find(&self, id: &str) -> Option<&ExpenseRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Storage position of the record with the given id
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    /// True if the most recent notification to an observer failed
    pub fn last_persist_failed(&self) -> bool {
        self.last_persist_failed
    }

    /// Validate the form and add it to the end of the ledger
    pub fn append(&mut self, form: &ExpenseForm) -> Result<ExpenseRecord, LedgerError> {
        let details = self.validate(form)?;
        let record = ExpenseRecord::new(details);
        self.records.push(record.clone());
        info!("Appended expense {} at position {}", record.id, self.records.len() - 1);
        self.notify();
        Ok(record)
    }

    /// Validate the form and replace the record at `position` in place.
    /// All other positions are unchanged.
    pub fn update(&mut self, position: usize, form: &ExpenseForm) -> Result<ExpenseRecord, LedgerError> {
        let details = self.validate(form)?;
        let len = self.records.len();
        let existing = self.records.get_mut(position).ok_or_else(|| {
            warn!("Update rejected: position {} out of range (len {})", position, len);
            LedgerError::PositionOutOfRange { position, len }
        })?;

        let revised = existing.revise(details);
        *existing = revised.clone();
        info!("Updated expense {} at position {}", revised.id, position);
        self.notify();
        Ok(revised)
    }

    /// Replace the record with the given id, wherever it currently sits
    pub fn update_by_id(&mut self, id: &str, form: &ExpenseForm) -> Result<ExpenseRecord, LedgerError> {
        let details = self.validate(form)?;
        let position = self
            .position_of(id)
            .ok_or_else(|| LedgerError::RecordNotFound(id.to_string()))?;

        let revised = self.records[position].revise(details);
        self.records[position] = revised.clone();
        info!("Updated expense {} at position {}", id, position);
        self.notify();
        Ok(revised)
    }

    /// Remove the record at `position`, shifting later records down.
    /// Out-of-range positions are a silent no-op and return `None`.
    pub fn delete(&mut self, position: usize) -> Option<ExpenseRecord> {
        if position >= self.records.len() {
            debug!("Delete ignored: position {} out of range (len {})", position, self.records.len());
            return None;
        }
        let removed = self.records.remove(position);
        info!("Deleted expense {} from position {}", removed.id, position);
        self.notify();
        Some(removed)
    }

    pub fn delete_by_id(&mut self, id: &str) -> Option<ExpenseRecord> {
        let position = self.position_of(id)?;
        self.delete(position)
    }

    fn validate(&self, form: &ExpenseForm) -> Result<ExpenseDetails, LedgerError> {
        self.validator.validate(form).map_err(|e| {
            warn!("Rejected expense form: {:?}", e);
            LedgerError::Validation(e)
        })
    }

    fn notify(&mut self) {
        let mut failed = false;
        for observer in &self.observers {
            if let Err(e) = observer.ledger_changed(&self.records) {
                error!("Failed to persist ledger ({} records): {:#}", self.records.len(), e);
                failed = true;
            }
        }
        self.last_persist_failed = failed;
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use shared::{Category, Currency, ExpenseValidationError};
    use std::sync::{Arc, Mutex};

    /// Observer that records the ledger length it was shown each time
    #[derive(Clone, Default)]
    struct RecordingObserver {
        seen: Arc<Mutex<Vec<usize>>>,
    }

    impl LedgerObserver for RecordingObserver {
        fn ledger_changed(&self, ledger: &[ExpenseRecord]) -> Result<()> {
            self.seen.lock().unwrap().push(ledger.len());
            Ok(())
        }
    }

    struct FailingObserver;

    impl LedgerObserver for FailingObserver {
        fn ledger_changed(&self, _ledger: &[ExpenseRecord]) -> Result<()> {
            Err(anyhow!("disk full"))
        }
    }

    fn form(date: &str, category: &str, description: &str, amount: &str, currency: &str) -> ExpenseForm {
        ExpenseForm {
            date: date.to_string(),
            category: category.to_string(),
            description: description.to_string(),
            payment: "card".to_string(),
            amount: amount.to_string(),
            currency: currency.to_string(),
        }
    }

    fn seeded_store() -> RecordStore {
        let mut store = RecordStore::new();
        store.append(&form("2025-07-01", "food", "Ramen", "1200", "JPY")).unwrap();
        store.append(&form("2025-07-02", "shopping", "Snacks", "3500", "KRW")).unwrap();
        store.append(&form("2025-07-03", "activity", "Ski lift", "6000", "JPY")).unwrap();
        store
    }

    #[test]
    fn test_append_grows_by_one_and_ends_with_record() {
        let mut store = seeded_store();
        let before = store.len();
        let record = store.append(&form("2025-07-04", "other", "Laundry", "500", "JPY")).unwrap();
        assert_eq!(store.len(), before + 1);
        assert_eq!(store.all().last(), Some(&record));
    }

    #[test]
    fn test_rejected_amount_leaves_ledger_unchanged() {
        let mut store = seeded_store();
        let before = store.all().to_vec();

        for amount in ["0", "-5"] {
            let result = store.append(&form("2025-07-04", "food", "Bad", amount, "KRW"));
            assert!(matches!(
                result,
                Err(LedgerError::Validation(ExpenseValidationError::InvalidAmount))
            ));
        }
        assert_eq!(store.all(), before.as_slice());
    }

    #[test]
    fn test_update_in_range_touches_only_that_position() {
        let mut store = seeded_store();
        let before = store.all().to_vec();

        let updated = store.update(1, &form("2025-07-02", "food", "Crab", "9000", "KRW")).unwrap();
        assert_eq!(store.len(), before.len());
        assert_eq!(updated.id, before[1].id);
        assert_eq!(store.get(1).unwrap().category, Category::Food);
        assert_eq!(store.get(0), Some(&before[0]));
        assert_eq!(store.get(2), Some(&before[2]));
    }

    #[test]
    fn test_update_out_of_range_is_rejected() {
        let mut store = seeded_store();
        let before = store.all().to_vec();
        let result = store.update(3, &form("2025-07-02", "food", "Crab", "9000", "KRW"));
        assert!(matches!(result, Err(LedgerError::PositionOutOfRange { position: 3, len: 3 })));
        assert_eq!(store.all(), before.as_slice());
    }

    #[test]
    fn test_invalid_update_leaves_record_unchanged() {
        let mut store = seeded_store();
        let before = store.all().to_vec();
        let result = store.update(0, &form("2025-07-01", "food", "   ", "100", "KRW"));
        assert!(matches!(
            result,
            Err(LedgerError::Validation(ExpenseValidationError::EmptyDescription))
        ));
        assert_eq!(store.all(), before.as_slice());
    }

    #[test]
    fn test_delete_shifts_later_positions() {
        let mut store = seeded_store();
        let third = store.get(2).unwrap().clone();
        let removed = store.delete(1).unwrap();
        assert_eq!(removed.description, "Snacks");
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1), Some(&third));
    }

    #[test]
    fn test_delete_out_of_range_is_noop() {
        let mut store = seeded_store();
        let before = store.all().to_vec();
        assert!(store.delete(10).is_none());
        assert_eq!(store.all(), before.as_slice());
    }

    #[test]
    fn test_id_addressing_survives_reordering_mutations() {
        let mut store = seeded_store();
        let target = store.get(2).unwrap().id.clone();

        // Removing an earlier record moves the target to a new position
        store.delete(0);
        assert_eq!(store.position_of(&target), Some(1));

        let updated = store
            .update_by_id(&target, &form("2025-07-03", "activity", "Ski rental", "4000", "JPY"))
            .unwrap();
        assert_eq!(updated.id, target);
        assert_eq!(store.get(1).unwrap().description, "Ski rental");
        assert_eq!(store.get(0).unwrap().description, "Snacks");

        assert!(store.delete_by_id(&target).is_some());
        assert!(store.find(&target).is_none());
        assert!(matches!(
            store.update_by_id(&target, &form("2025-07-03", "food", "x", "1", "KRW")),
            Err(LedgerError::RecordNotFound(_))
        ));
    }

    #[test]
    fn test_observers_see_every_mutation() {
        let observer = RecordingObserver::default();
        let mut store = RecordStore::new();
        store.register_observer(Box::new(observer.clone()));

        store.append(&form("2025-07-01", "food", "Ramen", "1200", "JPY")).unwrap();
        store.append(&form("2025-07-02", "food", "Sushi", "3000", "JPY")).unwrap();
        store.update(0, &form("2025-07-01", "food", "Ramen", "1300", "JPY")).unwrap();
        store.delete(1);
        // Rejected and no-op calls do not notify
        let _ = store.append(&form("", "food", "x", "1", "KRW"));
        store.delete(5);

        assert_eq!(*observer.seen.lock().unwrap(), vec![1, 2, 2, 1]);
    }

    #[test]
    fn test_persist_failure_keeps_in_memory_change() {
        let mut store = RecordStore::new();
        store.register_observer(Box::new(FailingObserver));

        let record = store.append(&form("2025-07-01", "food", "Ramen", "1200", "JPY")).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(0).unwrap().id, record.id);
        assert_eq!(store.get(0).unwrap().currency, Currency::Jpy);
        assert!(store.last_persist_failed());
    }
}
