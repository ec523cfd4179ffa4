//! # Backend Module
//!
//! Wires the domain services to storage. The backend is fully synchronous:
//! every mutation goes through the [`ExpenseService`](domain::ExpenseService),
//! which persists the whole ledger before returning.

use anyhow::Result;
use log::info;
use shared::LedgerConfig;
use std::path::Path;

pub mod domain;
pub mod storage;

use domain::{ExportService, ExpenseService, LedgerStatistics, RecordStore, StatisticsService};
use domain::{ConversionTable, ExportedFile, ExportedLedger, LedgerError};
use storage::{Connection, FileConnection, LedgerConfigRepository, LedgerRepository};

/// Main backend struct that orchestrates all services
pub struct Backend {
    pub expense_service: ExpenseService,
    pub statistics_service: StatisticsService,
    pub export_service: ExportService,
    pub config: LedgerConfig,
}

impl Backend {
    /// Load the ledger through `connection` and persist every later change
    /// back to it
    pub fn new<C: Connection>(connection: &C, config: LedgerConfig) -> Self {
        let repository = LedgerRepository::new(connection.create_key_value_store(), config.storage_key.clone());
        let records = repository.load();

        let mut store = RecordStore::with_records(records);
        store.register_observer(Box::new(repository));

        Backend {
            expense_service: ExpenseService::new(store),
            statistics_service: StatisticsService::with_conversion(ConversionTable::from_config(&config)),
            export_service: ExportService::new(config.export_file_prefix.clone()),
            config,
        }
    }

    /// Open the file-backed ledger in `data_dir`, or in the default data
    /// directory when none is given. The config file is created on first use.
    pub fn open(data_dir: Option<&Path>) -> Result<Self> {
        let connection = match data_dir {
            Some(dir) => FileConnection::new(dir)?,
            None => FileConnection::new_default()?,
        };
        let config = LedgerConfigRepository::new(connection.clone()).load_or_create()?;
        info!("Opening ledger in {}", connection.base_directory().display());
        Ok(Self::new(&connection, config))
    }

    pub fn statistics(&self) -> LedgerStatistics {
        self.statistics_service.compute_statistics(self.expense_service.records())
    }

    pub fn export_csv(&self) -> Result<ExportedLedger, LedgerError> {
        self.export_service.export_csv(self.expense_service.records())
    }

    pub fn export_to_path(&self, custom_dir: Option<&str>) -> Result<ExportedFile, LedgerError> {
        self.export_service
            .export_to_path(self.expense_service.records(), custom_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::file::test_utils::TestEnvironment;
    use crate::backend::storage::{InMemoryKeyValueStore, KeyValueStorage};
    use crate::backend::domain::{DeleteConfirmation, ExpenseRecord};
    use shared::{Category, CategoryFilter, Currency, ExpenseForm};

    struct AlwaysYes;

    impl DeleteConfirmation for AlwaysYes {
        fn confirm_delete(&self, _expense: &ExpenseRecord) -> bool {
            true
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

    #[test]
    fn test_changes_survive_reopen() {
        let env = TestEnvironment::new().unwrap();
        {
            let mut backend = Backend::open(Some(env.base_directory())).unwrap();
            backend
                .expense_service
                .submit(&form("2025-07-01", "food", "Soup curry", "1500", "JPY"))
                .unwrap();
            backend
                .expense_service
                .submit(&form("2025-07-02", "transportation", "JR pass", "30000", "KRW"))
                .unwrap();
        }

        let backend = Backend::open(Some(env.base_directory())).unwrap();
        let records = backend.expense_service.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].description, "Soup curry");
        assert_eq!(records[0].currency, Currency::Jpy);
        assert!(env.base_directory().join("budgetData.json").exists());
        assert!(env.base_directory().join("ledger_config.yaml").exists());
    }

    #[test]
    fn test_ids_of_legacy_records_survive_reopen() {
        let store = InMemoryKeyValueStore::new();
        store
            .save(
                "budgetData",
                r#"[{"date":"2025-07-01","category":"food","description":"Soup curry","payment":"card","amount":1500,"currency":"JPY","timestamp":"2025-07-01T09:00:00.000Z"}]"#,
            )
            .unwrap();

        let first_id = Backend::new(&store, LedgerConfig::default()).expense_service.records()[0]
            .id
            .clone();

        let mut reopened = Backend::new(&store, LedgerConfig::default());
        let form = reopened.expense_service.begin_edit(&first_id).unwrap();
        assert_eq!(form.description, "Soup curry");

        let mut third = Backend::new(&store, LedgerConfig::default());
        assert_eq!(third.expense_service.records()[0].id, first_id);
        assert!(third.expense_service.delete(&first_id, &AlwaysYes).is_ok());
    }

    #[test]
    fn test_statistics_use_configured_rates() {
        let store = InMemoryKeyValueStore::new();
        let mut config = LedgerConfig::default();
        config.conversion_rates.insert("JPY".to_string(), 10.0);

        let mut backend = Backend::new(&store, config);
        backend
            .expense_service
            .submit(&form("2025-07-01", "food", "Ramen", "1000", "JPY"))
            .unwrap();
        backend
            .expense_service
            .submit(&form("2025-07-02", "food", "Kimbap", "5000", "KRW"))
            .unwrap();

        let stats = backend.statistics();
        assert_eq!(stats.total_expenses, 15000.0);
        assert_eq!(stats.total_days, 2);
        assert_eq!(stats.average_daily, 7500.0);
        assert_eq!(stats.total_by_category.get(&Category::Food), Some(&6000.0));
    }

    #[test]
    fn test_failed_save_keeps_in_memory_ledger() {
        let store = InMemoryKeyValueStore::new();
        let mut backend = Backend::new(&store, LedgerConfig::default());
        store.set_fail_saves(true);

        backend
            .expense_service
            .submit(&form("2025-07-01", "shopping", "Royce", "2000", "JPY"))
            .unwrap();
        assert_eq!(backend.expense_service.records().len(), 1);
        assert!(backend.expense_service.last_persist_failed());
        assert_eq!(store.load("budgetData").unwrap(), None);

        store.set_fail_saves(false);
        backend.expense_service.set_filter(CategoryFilter::Only(Category::Shopping));
        backend
            .expense_service
            .submit(&form("2025-07-02", "shopping", "LeTAO", "1800", "JPY"))
            .unwrap();
        assert!(!backend.expense_service.last_persist_failed());
        assert!(store.raw("budgetData").unwrap().contains("Royce"));
    }

    #[test]
    fn test_export_covers_full_ledger_regardless_of_filter() {
        let store = InMemoryKeyValueStore::new();
        let mut backend = Backend::new(&store, LedgerConfig::default());
        assert!(matches!(backend.export_csv(), Err(LedgerError::NothingToExport)));

        backend
            .expense_service
            .submit(&form("2025-07-01", "food", "Ramen", "1000", "JPY"))
            .unwrap();
        backend
            .expense_service
            .submit(&form("2025-07-02", "activity", "Ski", "5000", "KRW"))
            .unwrap();
        backend.expense_service.set_filter(CategoryFilter::Only(Category::Activity));

        let exported = backend.export_csv().unwrap();
        assert_eq!(exported.record_count, 2);
        assert!(exported.filename.starts_with("홋카이도_여행_가계부_"));
    }
}
