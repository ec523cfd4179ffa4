//! Ledger persistence on top of a [`KeyValueStorage`].
//!
//! The whole ledger is stored as one JSON array under the configured key and
//! rewritten in full after every mutation. Loading never fails the caller: an
//! absent or empty value yields an empty ledger. A value that cannot be read
//! also yields an empty ledger, but is first copied to `<key>_backup` so the
//! next save does not destroy the only copy.

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use serde_json::Value;

use crate::backend::domain::models::ExpenseRecord;
use crate::backend::domain::record_store::LedgerObserver;
use crate::backend::storage::traits::KeyValueStorage;

pub struct LedgerRepository<S: KeyValueStorage> {
    storage: S,
    key: String,
}

impl<S: KeyValueStorage> LedgerRepository<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Key an unreadable ledger is copied to before it is replaced
    pub fn backup_key(&self) -> String {
        format!("{}_backup", self.key)
    }

    /// Load the stored ledger in its stored order.
    ///
    /// Records saved before ids existed are given a fresh id, and the ledger
    /// is written back once so those ids stay the same on the next load.
    pub fn load(&self) -> Vec<ExpenseRecord> {
        let raw = match self.storage.load(&self.key) {
            Ok(Some(raw)) if !raw.trim().is_empty() => raw,
            Ok(_) => {
                debug!("No stored ledger under '{}'", self.key);
                return Vec::new();
            }
            Err(e) => {
                warn!("Could not load ledger '{}', starting empty: {:#}", self.key, e);
                return Vec::new();
            }
        };

        match self.parse(&raw) {
            Ok((records, assigned_ids)) => {
                info!("Loaded {} expenses from '{}'", records.len(), self.key);
                if assigned_ids > 0 {
                    self.persist_assigned_ids(&records, assigned_ids);
                }
                records
            }
            Err(e) => {
                error!("Stored ledger '{}' is unreadable, starting empty: {:#}", self.key, e);
                self.back_up(&raw);
                Vec::new()
            }
        }
    }

    /// Parse the stored array, returning the records and how many of them had
    /// no id of their own
    fn parse(&self, raw: &str) -> Result<(Vec<ExpenseRecord>, usize)> {
        let entries: Vec<Value> = serde_json::from_str(raw)
            .with_context(|| format!("Stored ledger '{}' is not a JSON array", self.key))?;
        let assigned_ids = entries.iter().filter(|entry| entry.get("id").is_none()).count();

        let records: Vec<ExpenseRecord> = serde_json::from_value(Value::Array(entries))
            .with_context(|| format!("Stored ledger '{}' is not a valid expense list", self.key))?;
        Ok((records, assigned_ids))
    }

    fn persist_assigned_ids(&self, records: &[ExpenseRecord], assigned_ids: usize) {
        match self.save(records) {
            Ok(()) => info!("Assigned ids to {} stored expenses in '{}'", assigned_ids, self.key),
            Err(e) => warn!(
                "Could not store ids assigned to {} expenses in '{}'; they will change on next load: {:#}",
                assigned_ids, self.key, e
            ),
        }
    }

    fn back_up(&self, raw: &str) {
        let backup_key = self.backup_key();
        match self.storage.save(&backup_key, raw) {
            Ok(()) => warn!("Copied unreadable ledger '{}' to '{}'", self.key, backup_key),
            Err(e) => error!("Could not back up unreadable ledger '{}': {:#}", self.key, e),
        }
    }

    pub fn save(&self, ledger: &[ExpenseRecord]) -> Result<()> {
        let serialized = serde_json::to_string(ledger)?;
        self.storage.save(&self.key, &serialized)?;
        debug!("Persisted {} expenses under '{}'", ledger.len(), self.key);
        Ok(())
    }
}

impl<S: KeyValueStorage> LedgerObserver for LedgerRepository<S> {
    fn ledger_changed(&self, ledger: &[ExpenseRecord]) -> Result<()> {
        self.save(ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::ExpenseDetails;
    use crate::backend::storage::memory::InMemoryKeyValueStore;
    use chrono::NaiveDate;
    use shared::{Category, Currency, PaymentMethod};

    fn expense(date: &str, description: &str, amount: f64, currency: Currency) -> ExpenseRecord {
        ExpenseRecord::new(ExpenseDetails {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            category: Category::Food,
            description: description.to_string(),
            payment_method: PaymentMethod::Card,
            amount,
            currency,
        })
    }

    #[test]
    fn test_missing_key_loads_empty() {
        let repo = LedgerRepository::new(InMemoryKeyValueStore::new(), "budgetData");
        assert!(repo.load().is_empty());
    }

    #[test]
    fn test_empty_value_loads_empty() {
        let store = InMemoryKeyValueStore::new();
        store.save("budgetData", "").unwrap();
        let repo = LedgerRepository::new(store, "budgetData");
        assert!(repo.load().is_empty());
    }

    #[test]
    fn test_corrupt_value_loads_empty_and_is_backed_up() {
        let store = InMemoryKeyValueStore::new();
        store.save("budgetData", "{not json").unwrap();
        let repo = LedgerRepository::new(store.clone(), "budgetData");
        assert!(repo.load().is_empty());
        assert_eq!(store.raw("budgetData_backup").as_deref(), Some("{not json"));
    }

    #[test]
    fn test_unknown_category_keeps_blob_recoverable() {
        let store = InMemoryKeyValueStore::new();
        let blob = r#"[{"id":"a","date":"2025-07-01","category":"souvenirs","description":"Royce","payment":"cash","amount":2000,"currency":"JPY"}]"#;
        store.save("budgetData", blob).unwrap();
        let repo = LedgerRepository::new(store.clone(), "budgetData");

        assert!(repo.load().is_empty());
        repo.save(&[expense("2025-07-02", "Ramen", 1200.0, Currency::Jpy)]).unwrap();
        assert_eq!(store.raw("budgetData_backup").as_deref(), Some(blob));
    }

    #[test]
    fn test_saved_ledger_reloads_in_order() {
        let store = InMemoryKeyValueStore::new();
        let repo = LedgerRepository::new(store.clone(), "budgetData");
        let ledger = vec![
            expense("2025-07-02", "Ramen", 1200.0, Currency::Jpy),
            expense("2025-07-01", "Bus", 15.5, Currency::Other("USD".to_string())),
        ];

        repo.save(&ledger).unwrap();
        let reloaded = LedgerRepository::new(store, "budgetData").load();
        assert_eq!(reloaded, ledger);
    }

    #[test]
    fn test_stored_format_uses_record_field_names() {
        let store = InMemoryKeyValueStore::new();
        let repo = LedgerRepository::new(store.clone(), "budgetData");
        repo.save(&[expense("2025-07-02", "Ramen", 1200.0, Currency::Jpy)]).unwrap();

        let raw: serde_json::Value = serde_json::from_str(&store.raw("budgetData").unwrap()).unwrap();
        let first = &raw[0];
        assert_eq!(first["date"], "2025-07-02");
        assert_eq!(first["category"], "food");
        assert_eq!(first["payment"], "card");
        assert_eq!(first["amount"], 1200.0);
        assert_eq!(first["currency"], "JPY");
        assert!(first["timestamp"].is_string());
    }

    #[test]
    fn test_legacy_records_without_id_get_one() {
        let store = InMemoryKeyValueStore::new();
        store
            .save(
                "budgetData",
                r#"[{"date":"2025-07-01","category":"shopping","description":"Royce","payment":"cash","amount":2000,"currency":"JPY","timestamp":"2025-07-01T09:00:00.000Z"},
                    {"date":"2025-07-02","category":"food","description":"Jingisukan","payment":"card","amount":45000,"currency":"KRW","timestamp":"2025-07-02T12:00:00.000Z"}]"#,
            )
            .unwrap();

        let records = LedgerRepository::new(store.clone(), "budgetData").load();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].description, "Royce");
        assert_eq!(records[0].payment_method, PaymentMethod::Cash);
        assert!(!records[0].id.is_empty());
        assert_ne!(records[0].id, records[1].id);

        // Assigned ids are written back, so a later load sees the same ones
        let reloaded = LedgerRepository::new(store, "budgetData").load();
        assert_eq!(reloaded, records);
    }

    #[test]
    fn test_legacy_records_load_when_ids_cannot_be_stored() {
        let store = InMemoryKeyValueStore::new();
        store
            .save(
                "budgetData",
                r#"[{"date":"2025-07-01","category":"food","description":"Ramen","payment":"card","amount":1200,"currency":"JPY"}]"#,
            )
            .unwrap();
        store.set_fail_saves(true);

        let records = LedgerRepository::new(store.clone(), "budgetData").load();
        assert_eq!(records.len(), 1);
        assert!(!store.raw("budgetData").unwrap().contains(&records[0].id));
    }

    #[test]
    fn test_observer_persists_on_change() {
        let store = InMemoryKeyValueStore::new();
        let repo = LedgerRepository::new(store.clone(), "budgetData");
        repo.ledger_changed(&[expense("2025-07-02", "Ramen", 1200.0, Currency::Jpy)])
            .unwrap();
        assert!(store.raw("budgetData").unwrap().contains("Ramen"));

        store.set_fail_saves(true);
        assert!(repo.ledger_changed(&[]).is_err());
    }
}
