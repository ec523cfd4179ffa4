//! # Storage Layer
//!
//! Persistence for the ledger and its configuration. The domain layer only
//! sees [`LedgerObserver`](crate::backend::domain::record_store::LedgerObserver)
//! and the traits in [`traits`]; the concrete backends are:
//!
//! - [`file`]: one file per key in the data directory, plus the YAML config
//! - [`memory`]: an in-process map, used by tests and dry runs

pub mod file;
pub mod ledger_repository;
pub mod memory;
pub mod traits;

pub use file::{FileConnection, FileKeyValueStore, LedgerConfigRepository};
pub use ledger_repository::LedgerRepository;
pub use memory::InMemoryKeyValueStore;
pub use traits::{Connection, KeyValueStorage};
