//! Ledger statistics.
//!
//! Everything is recomputed from the raw ledger on each call; nothing is
//! cached between calls.
//!
//! `total_expenses` (and therefore `average_daily`) is normalized to KRW with
//! a fixed conversion table. The default table only knows JPY at 8.5 KRW; it
//! is an illustrative rate, not a live exchange rate, and any currency missing
//! from the table is added unconverted. The per-category totals are NOT
//! normalized: amounts in different currencies within one category are summed
//! as raw numbers.

use std::collections::BTreeMap;

use log::warn;
use shared::{Category, Currency, LedgerConfig};

use crate::backend::domain::models::ExpenseRecord;

/// Aggregate figures over the whole ledger
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LedgerStatistics {
    /// Sum of all amounts, normalized to KRW
    pub total_expenses: f64,
    /// Raw (unconverted) sums per category
    pub total_by_category: BTreeMap<Category, f64>,
    /// Raw sums per currency
    pub total_by_currency: BTreeMap<Currency, f64>,
    /// Inclusive day span between earliest and latest record; 0 when empty
    pub total_days: i64,
    pub average_daily: f64,
}

/// Fixed currency -> KRW multipliers
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionTable {
    rates: BTreeMap<Currency, f64>,
}

impl ConversionTable {
    pub fn new(rates: BTreeMap<Currency, f64>) -> Self {
        Self { rates }
    }

    /// Build the table from configuration, skipping entries that are not
    /// currency codes or not usable multipliers
    pub fn from_config(config: &LedgerConfig) -> Self {
        let mut rates = BTreeMap::new();
        for (code, rate) in &config.conversion_rates {
            match code.parse::<Currency>() {
                Ok(currency) if rate.is_finite() && *rate > 0.0 => {
                    rates.insert(currency, *rate);
                }
                _ => warn!("Ignoring conversion rate {} for '{}'", rate, code),
            }
        }
        Self { rates }
    }

    pub fn to_krw(&self, amount: f64, currency: &Currency) -> f64 {
        match self.rates.get(currency) {
            Some(rate) => amount * rate,
            None => amount,
        }
    }
}

impl Default for ConversionTable {
    fn default() -> Self {
        let mut rates = BTreeMap::new();
        rates.insert(Currency::Jpy, 8.5);
        Self { rates }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatisticsService {
    conversion: ConversionTable,
}

impl StatisticsService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_conversion(conversion: ConversionTable) -> Self {
        Self { conversion }
    }

    pub fn compute_statistics(&self, ledger: &[ExpenseRecord]) -> LedgerStatistics {
        let mut stats = LedgerStatistics::default();

        let (min_date, max_date) = match (
            ledger.iter().map(|r| r.date).min(),
            ledger.iter().map(|r| r.date).max(),
        ) {
            (Some(min), Some(max)) => (min, max),
            _ => return stats,
        };
        stats.total_days = (max_date - min_date).num_days() + 1;

        for expense in ledger {
            *stats.total_by_category.entry(expense.category).or_insert(0.0) += expense.amount;
            *stats
                .total_by_currency
                .entry(expense.currency.clone())
                .or_insert(0.0) += expense.amount;
            stats.total_expenses += self.conversion.to_krw(expense.amount, &expense.currency);
        }

        stats.average_daily = if stats.total_days > 0 {
            stats.total_expenses / stats.total_days as f64
        } else {
            0.0
        };

        stats
    }
}

/// Statistics with the default conversion table
pub fn compute_statistics(ledger: &[ExpenseRecord]) -> LedgerStatistics {
    StatisticsService::new().compute_statistics(ledger)
}
