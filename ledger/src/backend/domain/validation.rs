//! Expense form validation.
//!
//! Turns a raw [`ExpenseForm`] into [`ExpenseDetails`]. Fields are checked in a
//! fixed priority order (date, category, description, payment method, amount,
//! currency) and only the first failure is reported, so the same form always
//! yields the same single message.

use chrono::NaiveDate;
use shared::{Category, Currency, ExpenseForm, ExpenseValidationError, PaymentMethod};

use crate::backend::domain::models::ExpenseDetails;

/// Validator for the expense form
#[derive(Clone, Default)]
pub struct ExpenseValidator;

impl ExpenseValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a form, returning the first failing field
    pub fn validate(&self, form: &ExpenseForm) -> Result<ExpenseDetails, ExpenseValidationError> {
        let date = self.parse_date(&form.date)?;
        let category: Category = form.category.parse()?;

        let description = form.description.trim();
        if description.is_empty() {
            return Err(ExpenseValidationError::EmptyDescription);
        }

        let payment_method: PaymentMethod = form.payment.parse()?;
        let amount = self.clean_and_parse_amount(&form.amount)?;
        let currency: Currency = form.currency.parse()?;

        Ok(ExpenseDetails {
            date,
            category,
            description: description.to_string(),
            payment_method,
            amount,
            currency,
        })
    }

    fn parse_date(&self, input: &str) -> Result<NaiveDate, ExpenseValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ExpenseValidationError::MissingDate);
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| ExpenseValidationError::MissingDate)
    }

    /// Parse an amount, accepting thousands separators and surrounding spaces.
    /// The result is always finite and strictly positive.
    pub fn clean_and_parse_amount(&self, input: &str) -> Result<f64, ExpenseValidationError> {
        let cleaned: String = input
            .trim()
            .chars()
            .filter(|c| *c != ',' && !c.is_whitespace())
            .collect();

        match cleaned.parse::<f64>() {
            Ok(amount) if amount.is_finite() && amount > 0.0 => Ok(amount),
            _ => Err(ExpenseValidationError::InvalidAmount),
        }
    }
}

/// Keystroke clean-up for an interactive amount box: keep digits and the first decimal
/// point, drop everything else.
pub fn sanitize_amount_input(input: &str) -> String {
    let mut seen_point = false;
    input
        .chars()
        .filter(|c| match c {
            '0'..='9' => true,
            '.' if !seen_point => {
                seen_point = true;
                true
            }
            _ => false,
        })
        .collect()
}
