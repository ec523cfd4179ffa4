//! Errors surfaced by ledger operations.
use shared::ExpenseValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{0}")]
    Validation(#[from] ExpenseValidationError),

    #[error("no record at position {position} (ledger has {len})")]
    PositionOutOfRange { position: usize, len: usize },

    #[error("no record with id {0}")]
    RecordNotFound(String),

    #[error("내보낼 데이터가 없습니다.")]
    NothingToExport,

    #[error("delete was not confirmed")]
    DeleteDeclined,

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}
