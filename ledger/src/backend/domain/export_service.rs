//! Export of the ledger as delimited text.
//!
//! The export always covers the full ledger in storage order, regardless of
//! the active filter. Every value is wrapped in double quotes; quotes inside a
//! value are written as-is, without escaping.

use anyhow::Context;
use chrono::{Local, NaiveDate};
use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::domain::error::LedgerError;
use crate::backend::domain::models::ExpenseRecord;

pub const EXPORT_HEADERS: [&str; 6] = ["날짜", "항목", "내용", "결제방법", "금액", "통화"];

/// Render the ledger as a header row plus one quoted row per record
pub fn to_delimited_text(ledger: &[ExpenseRecord]) -> String {
    let mut lines = Vec::with_capacity(ledger.len() + 1);
    lines.push(EXPORT_HEADERS.join(","));

    for expense in ledger {
        let date = expense.date.format("%Y-%m-%d").to_string();
        let amount = expense.amount.to_string();
        let values = [
            date.as_str(),
            expense.category.display_name(),
            expense.description.as_str(),
            expense.payment_method.display_name(),
            amount.as_str(),
            expense.currency.code(),
        ];
        let row = values
            .iter()
            .map(|value| format!("\"{}\"", value))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(row);
    }

    lines.join("\n")
}

/// Export content ready to hand to a download or file write
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedLedger {
    pub filename: String,
    pub content: String,
    pub record_count: usize,
}

/// Result of writing an export to disk
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFile {
    pub file_path: PathBuf,
    pub record_count: usize,
}

#[derive(Debug, Clone)]
pub struct ExportService {
    file_prefix: String,
}

impl ExportService {
    pub fn new(file_prefix: impl Into<String>) -> Self {
        Self {
            file_prefix: file_prefix.into(),
        }
    }

    /// Filename for an export made on `date`
    pub fn filename_for(&self, date: NaiveDate) -> String {
        format!("{}_{}.csv", self.file_prefix, date.format("%Y-%m-%d"))
    }

    /// Build the export named after today's date
    pub fn export_csv(&self, ledger: &[ExpenseRecord]) -> Result<ExportedLedger, LedgerError> {
        self.export_csv_on(ledger, Local::now().date_naive())
    }

    pub fn export_csv_on(&self, ledger: &[ExpenseRecord], date: NaiveDate) -> Result<ExportedLedger, LedgerError> {
        if ledger.is_empty() {
            info!("Export skipped: ledger is empty");
            return Err(LedgerError::NothingToExport);
        }

        let exported = ExportedLedger {
            filename: self.filename_for(date),
            content: to_delimited_text(ledger),
            record_count: ledger.len(),
        };
        info!(
            "Exported {} records ({} bytes) as {}",
            exported.record_count,
            exported.content.len(),
            exported.filename
        );
        Ok(exported)
    }

    /// Write the export into `custom_dir`, or the Documents directory when
    /// no directory is given
    pub fn export_to_path(
        &self,
        ledger: &[ExpenseRecord],
        custom_dir: Option<&str>,
    ) -> Result<ExportedFile, LedgerError> {
        let exported = self.export_csv(ledger)?;
        let export_dir = self.resolve_export_dir(custom_dir)?;
        self.write_export(&export_dir, exported)
    }

    fn resolve_export_dir(&self, custom_dir: Option<&str>) -> Result<PathBuf, LedgerError> {
        match custom_dir {
            Some(dir) if !dir.trim().is_empty() => Ok(PathBuf::from(self.sanitize_path(dir))),
            _ => dirs::document_dir()
                .or_else(dirs::home_dir)
                .ok_or_else(|| {
                    error!("Could not determine default export directory");
                    LedgerError::Storage(anyhow::anyhow!("Failed to determine export directory"))
                }),
        }
    }

    fn write_export(&self, export_dir: &Path, exported: ExportedLedger) -> Result<ExportedFile, LedgerError> {
        fs::create_dir_all(export_dir)
            .with_context(|| format!("Failed to create export directory {}", export_dir.display()))?;

        let file_path = export_dir.join(&exported.filename);
        fs::write(&file_path, exported.content.as_bytes())
            .with_context(|| format!("Failed to write export file {}", file_path.display()))?;

        info!("Wrote {} records to {}", exported.record_count, file_path.display());
        Ok(ExportedFile {
            file_path,
            record_count: exported.record_count,
        })
    }

    /// Clean up a user-typed directory: surrounding quotes, escaped spaces,
    /// trailing separators and a leading `~`
    fn sanitize_path(&self, path: &str) -> String {
        let mut cleaned = path.trim().to_string();

        if cleaned.len() >= 2
            && ((cleaned.starts_with('"') && cleaned.ends_with('"'))
                || (cleaned.starts_with('\'') && cleaned.ends_with('\'')))
        {
            cleaned = cleaned[1..cleaned.len() - 1].trim().to_string();
        }

        cleaned = cleaned.replace("\\ ", " ");

        while cleaned.len() > 1 && (cleaned.ends_with('/') || cleaned.ends_with('\\')) {
            cleaned.pop();
        }

        if let Some(home) = dirs::home_dir() {
            if cleaned == "~" {
                cleaned = home.to_string_lossy().to_string();
            } else if let Some(rest) = cleaned.strip_prefix("~/").or_else(|| cleaned.strip_prefix("~\\")) {
                cleaned = home.join(rest).to_string_lossy().to_string();
            }
        }

        cleaned
    }
}

impl Default for ExportService {
    fn default() -> Self {
        Self::new(shared::LedgerConfig::default().export_file_prefix)
    }
}
