//! Domain model for a logged expense.
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::{Category, Currency, ExpenseForm, PaymentMethod};
use uuid::Uuid;

/// The validated content of an expense, without identity or timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDetails {
    pub date: NaiveDate,
    pub category: Category,
    pub description: String,
    pub payment_method: PaymentMethod,
    pub amount: f64,
    pub currency: Currency,
}

/// One expense in the ledger.
///
/// `id` is generated at creation and survives edits. Blobs written before ids
/// existed load with a freshly generated one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    #[serde(default = "ExpenseRecord::generate_id")]
    pub id: String,
    pub date: NaiveDate,
    pub category: Category,
    pub description: String,
    #[serde(rename = "payment", alias = "paymentMethod")]
    pub payment_method: PaymentMethod,
    pub amount: f64,
    pub currency: Currency,
    /// Creation or last modification instant; informational only
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ExpenseRecord {
    pub fn new(details: ExpenseDetails) -> Self {
        Self {
            id: Self::generate_id(),
            date: details.date,
            category: details.category,
            description: details.description,
            payment_method: details.payment_method,
            amount: details.amount,
            currency: details.currency,
            timestamp: Utc::now(),
        }
    }

    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Replace the content of this record, keeping its id
    pub fn revise(&self, details: ExpenseDetails) -> Self {
        Self {
            id: self.id.clone(),
            ..Self::new(details)
        }
    }

    /// Pre-fill a form with this record, as the edit dialog does
    pub fn to_form(&self) -> ExpenseForm {
        ExpenseForm {
            date: self.date.format("%Y-%m-%d").to_string(),
            category: self.category.tag().to_string(),
            description: self.description.clone(),
            payment: self.payment_method.tag().to_string(),
            amount: self.amount.to_string(),
            currency: self.currency.code().to_string(),
        }
    }
}
