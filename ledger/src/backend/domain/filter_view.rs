//! Filtered, date-sorted view of the ledger for display.
//!
//! The view keeps only the active category filter. Its rows are recomputed in
//! full from the ledger on every call and never written back; each row carries
//! the record id so edits and deletes chosen from the table address the
//! record itself rather than a display index.

use shared::{format_currency, CategoryFilter};

use crate::backend::domain::models::ExpenseRecord;

/// One row of the expense table
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRow {
    pub id: String,
    pub date: String,
    pub category_name: &'static str,
    pub description: String,
    pub payment_name: &'static str,
    pub formatted_amount: String,
}

#[derive(Debug, Clone, Default)]
pub struct FilterView {
    active: CategoryFilter,
}

impl FilterView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_filter(&mut self, filter: CategoryFilter) {
        self.active = filter;
    }

    pub fn active_filter(&self) -> CategoryFilter {
        self.active
    }

    /// Records matching the active filter, most recent date first.
    /// Records sharing a date keep their ledger order.
    pub fn visible<'a>(&self, ledger: &'a [ExpenseRecord]) -> Vec<&'a ExpenseRecord> {
        let mut visible: Vec<&ExpenseRecord> = ledger
            .iter()
            .filter(|record| self.active.matches(record.category))
            .collect();
        // sort_by is stable
        visible.sort_by(|a, b| b.date.cmp(&a.date));
        visible
    }

    /// Visible records formatted for the table
    pub fn visible_rows(&self, ledger: &[ExpenseRecord]) -> Vec<ExpenseRow> {
        self.visible(ledger).into_iter().map(Self::format_row).collect()
    }

    fn format_row(record: &ExpenseRecord) -> ExpenseRow {
        ExpenseRow {
            id: record.id.clone(),
            date: record.date.format("%Y-%m-%d").to_string(),
            category_name: record.category.display_name(),
            description: record.description.clone(),
            payment_name: record.payment_method.display_name(),
            formatted_amount: format_currency(record.amount, &record.currency),
        }
    }
}
