use crate::error::{LedgerError, LedgerResult};
use crate::models::Transaction;

use super::{created_by_label, REPORT_FIELDS};

/// One header row, then one row per record. Fields containing commas, quotes
/// or newlines are quoted by the writer.
pub(super) fn render(records: &[Transaction]) -> LedgerResult<Vec<u8>> {
    let mut wtr = ::csv::Writer::from_writer(Vec::new());
    wtr.write_record(REPORT_FIELDS)
        .map_err(|e| LedgerError::Export(format!("Failed to write CSV header: {e}")))?;

    for txn in records {
        wtr.write_record([
            txn.date.format("%Y-%m-%d").to_string(),
            txn.kind.as_str().to_string(),
            txn.category.as_str().to_string(),
            txn.amount.to_string(),
            txn.description.clone(),
            created_by_label(txn),
        ])
        .map_err(|e| LedgerError::Export(format!("Failed to write CSV row: {e}")))?;
    }

    wtr.into_inner()
        .map_err(|e| LedgerError::Export(format!("Failed to flush CSV: {e}")))
}
