//! Expense service: the form-level workflow over the record store.
//!
//! A submitted form either appends a new expense or, while an edit session is
//! open, replaces the expense being edited. Edit sessions and deletes address
//! records by id, so a display row chosen from the filtered, date-sorted
//! table always resolves to the right record even if the ledger changed in
//! between.

use log::{info, warn};
use shared::{CategoryFilter, ExpenseForm};

use crate::backend::domain::error::LedgerError;
use crate::backend::domain::filter_view::{ExpenseRow, FilterView};
use crate::backend::domain::models::ExpenseRecord;
use crate::backend::domain::record_store::RecordStore;

/// Explicit user confirmation required before a delete
pub trait DeleteConfirmation {
    fn confirm_delete(&self, expense: &ExpenseRecord) -> bool;
}

/// Outcome of a form submission
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Added(ExpenseRecord),
    Updated(ExpenseRecord),
}

impl Submission {
    pub fn record(&self) -> &ExpenseRecord {
        match self {
            Submission::Added(record) | Submission::Updated(record) => record,
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            Submission::Added(_) => "지출 내역을 추가했습니다.",
            Submission::Updated(_) => "지출 내역을 수정했습니다.",
        }
    }
}

pub struct ExpenseService {
    store: RecordStore,
    filter_view: FilterView,
    editing: Option<String>,
}

impl ExpenseService {
    pub fn new(store: RecordStore) -> Self {
        Self {
            store,
            filter_view: FilterView::new(),
            editing: None,
        }
    }

    pub fn records(&self) -> &[ExpenseRecord] {
        self.store.all()
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn find(&self, id: &str) -> Option<&ExpenseRecord> {
        self.store.find(id)
    }

    /// Id of the record currently being edited, if any
    pub fn editing_id(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    /// Open an edit session and return the record as a pre-filled form
    pub fn begin_edit(&mut self, id: &str) -> Result<ExpenseForm, LedgerError> {
        let record = self
            .store
            .find(id)
            .ok_or_else(|| LedgerError::RecordNotFound(id.to_string()))?;
        let form = record.to_form();
        self.editing = Some(id.to_string());
        info!("Editing expense {}", id);
        Ok(form)
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Append the form, or apply it to the record being edited.
    ///
    /// A rejected form keeps the edit session open so it can be corrected. If
    /// the edited record vanished in the meantime the session is closed.
    pub fn submit(&mut self, form: &ExpenseForm) -> Result<Submission, LedgerError> {
        match self.editing.clone() {
            Some(id) => match self.store.update_by_id(&id, form) {
                Ok(record) => {
                    self.editing = None;
                    Ok(Submission::Updated(record))
                }
                Err(LedgerError::RecordNotFound(missing)) => {
                    warn!("Expense {} disappeared while being edited", missing);
                    self.editing = None;
                    Err(LedgerError::RecordNotFound(missing))
                }
                Err(e) => Err(e),
            },
            None => self.store.append(form).map(Submission::Added),
        }
    }

    /// Delete the record with `id` once the user has confirmed
    pub fn delete(&mut self, id: &str, confirmation: &dyn DeleteConfirmation) -> Result<ExpenseRecord, LedgerError> {
        let record = self
            .store
            .find(id)
            .ok_or_else(|| LedgerError::RecordNotFound(id.to_string()))?;

        if !confirmation.confirm_delete(record) {
            info!("Delete of expense {} declined", id);
            return Err(LedgerError::DeleteDeclined);
        }

        let removed = self
            .store
            .delete_by_id(id)
            .ok_or_else(|| LedgerError::RecordNotFound(id.to_string()))?;
        if self.editing.as_deref() == Some(id) {
            self.editing = None;
        }
        Ok(removed)
    }

    pub fn set_filter(&mut self, filter: CategoryFilter) {
        self.filter_view.set_filter(filter);
    }

    pub fn active_filter(&self) -> CategoryFilter {
        self.filter_view.active_filter()
    }

    /// Table rows for the active filter, most recent first
    pub fn visible_rows(&self) -> Vec<ExpenseRow> {
        self.filter_view.visible_rows(self.store.all())
    }

    pub fn last_persist_failed(&self) -> bool {
        self.store.last_persist_failed()
    }
}
