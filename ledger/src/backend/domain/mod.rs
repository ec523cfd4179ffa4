//! # Domain Module
//!
//! Business logic of the expense ledger, independent of any front end or
//! storage backend.
//!
//! ## Module Organization
//!
//! - **models**: the `ExpenseRecord` entity
//! - **validation**: expense form validation in fixed priority order
//! - **record_store**: the ledger itself, position- and id-addressed CRUD,
//!   post-mutation observers
//! - **filter_view**: category-filtered, date-sorted display rows
//! - **statistics_service**: totals, per-category/per-currency sums, trip length
//! - **export_service**: delimited-text export and writing it to disk
//! - **expense_service**: form workflow (add, edit session, confirmed delete)
//!
//! ## Business Rules
//!
//! - Amounts are strictly positive
//! - Category and payment method must be one of the known tags
//! - Descriptions are non-blank after trimming
//! - Statistics and the filter view are always recomputed from the full ledger

pub mod error;
pub mod models;
pub mod validation;
pub mod record_store;
pub mod filter_view;
pub mod statistics_service;
pub mod export_service;
pub mod expense_service;

pub use error::LedgerError;
pub use models::{ExpenseDetails, ExpenseRecord};
pub use validation::*;
pub use record_store::*;
pub use filter_view::*;
pub use statistics_service::*;
pub use export_service::*;
pub use expense_service::*;
