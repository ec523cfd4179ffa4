//! # File Storage Module
//!
//! File-based storage for the ledger. All data lives in a single data
//! directory:
//!
//! ```text
//! Travel Ledger/
//! ├── ledger_config.yaml    ← LedgerConfigRepository
//! └── budgetData.json       ← FileKeyValueStore, one file per key
//! ```
//!
//! Every write goes to a temp file first and is renamed into place, so a
//! crash mid-write leaves the previous contents intact.

pub mod config_repository;
pub mod connection;
pub mod key_value_repository;

#[cfg(test)]
pub mod test_utils;

pub use config_repository::LedgerConfigRepository;
pub use connection::{FileConnection, DATA_DIR_ENV};
pub use key_value_repository::FileKeyValueStore;
