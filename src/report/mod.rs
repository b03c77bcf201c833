//! Turns ledger rows into downloadable report files.
//!
//! Exporting is pure: records in, bytes out. Nothing here touches the stores.

mod csv;
mod pdf;

use chrono::NaiveDate;
use tracing::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::TimeRange;
use crate::models::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReportFormat {
    Pdf,
    Csv,
}

impl ReportFormat {
    pub(crate) fn parse(s: &str) -> LedgerResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "csv" => Ok(Self::Csv),
            _ => Err(LedgerError::invalid_input(format!(
                "report format must be pdf or csv, got '{s}'"
            ))),
        }
    }

    pub(crate) fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Csv => "csv",
        }
    }

    pub(crate) fn content_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Csv => "text/csv",
        }
    }
}

/// Header fields shared by every format, in column order.
pub(crate) const REPORT_FIELDS: [&str; 6] =
    ["date", "type", "category", "amount", "description", "createdBy"];

pub(crate) fn created_by_label(txn: &Transaction) -> String {
    txn.created_by
        .map(|id| id.to_string())
        .unwrap_or_else(|| "system".to_string())
}

/// Serialize `records` in the requested format.
pub(crate) fn export(records: &[Transaction], format: ReportFormat, title: &str) -> LedgerResult<Vec<u8>> {
    let bytes = match format {
        ReportFormat::Csv => csv::render(records)?,
        ReportFormat::Pdf => pdf::render(title, records),
    };
    debug!(records = records.len(), bytes = bytes.len(), format = format.extension(), "report rendered");
    Ok(bytes)
}

/// Attachment name for a report, e.g. `financial-report-month-2024-04.csv`.
pub(crate) fn report_filename(range: TimeRange, today: NaiveDate, format: ReportFormat) -> LedgerResult<String> {
    let window = range.window(today)?;
    Ok(format!(
        "financial-report-{range}-{}.{}",
        window.label,
        format.extension()
    ))
}

/// `Content-Disposition` value announcing the report as a download.
pub(crate) fn content_disposition(filename: &str) -> String {
    format!("attachment; filename=\"{filename}\"")
}
