mod schema;

use anyhow::Context;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::error::{LedgerError, LedgerResult};
use crate::models::*;
use crate::util::sum_amounts;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

const TRANSACTION_COLUMNS: &str = "id, type, category, amount, description, date, created_by,
     reference_id, reference_type, status, created_at";

const BUDGET_COLUMNS: &str =
    "id, category, amount, period_type, start_date, end_date, created_by, created_at";

/// Outcome of clearing a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusChange {
    Completed,
    /// Another caller cleared it first; nothing was written.
    AlreadyCompleted,
}

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        debug!(path = %path.display(), "ledger database opened");
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> rusqlite::Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database - apply full schema
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    // ── Transactions ──────────────────────────────────────────

    pub(crate) fn record_transaction(&self, txn: &NewTransaction) -> LedgerResult<i64> {
        let valid = validate_transaction(txn).map_err(|e| {
            warn!(error = %e, "transaction rejected");
            e
        })?;

        self.conn.execute(
            "INSERT INTO financial_transactions
                 (type, category, amount, description, date, created_by, reference_id, reference_type, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                txn.kind.as_str(),
                valid.category.as_str(),
                txn.amount.to_string(),
                txn.description.trim(),
                valid.date.format(DATE_FORMAT).to_string(),
                txn.created_by,
                txn.reference.map(|r| r.id),
                txn.reference.map(|r| r.kind.as_str()),
                valid.status.as_str(),
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(
            id,
            kind = %txn.kind,
            category = %valid.category,
            amount = %txn.amount,
            status = %valid.status,
            "transaction recorded"
        );
        Ok(id)
    }

    pub(crate) fn get_transaction(&self, id: i64) -> LedgerResult<Option<Transaction>> {
        let result = self.conn.query_row(
            &format!("SELECT {TRANSACTION_COLUMNS} FROM financial_transactions WHERE id = ?1"),
            params![id],
            row_to_transaction,
        );
        match result {
            Ok(t) => Ok(Some(t)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Rows matching every set filter field, newest date first; rows sharing a
    /// date keep insertion order.
    pub(crate) fn list_transactions(&self, filter: &TransactionFilter) -> LedgerResult<Vec<Transaction>> {
        let mut sql = format!("SELECT {TRANSACTION_COLUMNS} FROM financial_transactions WHERE 1=1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(kind) = filter.kind {
            sql.push_str(&format!(" AND type = ?{}", param_values.len() + 1));
            param_values.push(Box::new(kind.as_str()));
        }
        if let Some(category) = filter.category {
            sql.push_str(&format!(" AND category = ?{}", param_values.len() + 1));
            param_values.push(Box::new(category.as_str()));
        }
        if let Some(status) = filter.status {
            sql.push_str(&format!(" AND status = ?{}", param_values.len() + 1));
            param_values.push(Box::new(status.as_str()));
        }
        if let Some(start) = filter.start_date {
            sql.push_str(&format!(" AND date >= ?{}", param_values.len() + 1));
            param_values.push(Box::new(start.format(DATE_FORMAT).to_string()));
        }
        if let Some(end) = filter.end_date {
            sql.push_str(&format!(" AND date <= ?{}", param_values.len() + 1));
            param_values.push(Box::new(end.format(DATE_FORMAT).to_string()));
        }

        sql.push_str(" ORDER BY date DESC, id ASC");
        debug!(%sql, params = param_values.len(), "listing transactions");

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), row_to_transaction)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Clears a pending transaction. The update only applies while the row is
    /// still pending, so concurrent clears write at most once.
    pub(crate) fn update_status(&self, id: i64, status: TransactionStatus) -> LedgerResult<StatusChange> {
        if status != TransactionStatus::Completed {
            return Err(LedgerError::validation(
                "transactions can only move from pending to completed",
            ));
        }

        let changed = self.conn.execute(
            "UPDATE financial_transactions SET status = ?1 WHERE id = ?2 AND status = ?3",
            params![
                TransactionStatus::Completed.as_str(),
                id,
                TransactionStatus::Pending.as_str()
            ],
        )?;
        if changed > 0 {
            info!(id, "transaction cleared");
            return Ok(StatusChange::Completed);
        }

        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM financial_transactions WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        if exists {
            debug!(id, "transaction already completed");
            Ok(StatusChange::AlreadyCompleted)
        } else {
            Err(LedgerError::NotFound {
                entity: "Transaction",
                id,
            })
        }
    }

    // ── Budgets ───────────────────────────────────────────────

    pub(crate) fn create_budget(&self, budget: &NewBudget) -> LedgerResult<i64> {
        let valid = validate_budget(budget).map_err(|e| {
            warn!(error = %e, "budget rejected");
            e
        })?;

        self.conn.execute(
            "INSERT INTO budgets (category, amount, period_type, start_date, end_date, created_by, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                valid.category.as_str(),
                budget.amount.to_string(),
                valid.period_type.as_str(),
                valid.start_date.format(DATE_FORMAT).to_string(),
                budget.end_date.map(|d| d.format(DATE_FORMAT).to_string()),
                budget.created_by,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(
            id,
            category = %valid.category,
            amount = %budget.amount,
            period = %valid.period_type,
            "budget created"
        );
        Ok(id)
    }

    pub(crate) fn list_budgets(&self, period: Option<PeriodType>) -> LedgerResult<Vec<Budget>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budgets
             WHERE (?1 IS NULL OR period_type = ?1)
             ORDER BY start_date DESC, id"
        ))?;
        let rows = stmt.query_map(params![period.map(|p| p.as_str())], row_to_budget)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Budgets of `period` whose `[start_date, end_date]` covers `as_of`.
    pub(crate) fn list_active_budgets(
        &self,
        as_of: NaiveDate,
        period: PeriodType,
    ) -> LedgerResult<Vec<Budget>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budgets
             WHERE period_type = ?1
               AND start_date <= ?2
               AND (end_date IS NULL OR end_date >= ?2)
             ORDER BY category, id"
        ))?;
        let rows = stmt.query_map(
            params![period.as_str(), as_of.format(DATE_FORMAT).to_string()],
            row_to_budget,
        )?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn total_monthly_budget(&self, as_of: NaiveDate) -> LedgerResult<Decimal> {
        let budgets = self.list_active_budgets(as_of, PeriodType::Monthly)?;
        sum_amounts(budgets.iter().map(|b| b.amount))
    }
}

// ── Validation ────────────────────────────────────────────────

pub(crate) struct ValidTransaction {
    pub(crate) category: Category,
    pub(crate) date: NaiveDate,
    pub(crate) status: TransactionStatus,
}

pub(crate) fn validate_transaction(txn: &NewTransaction) -> LedgerResult<ValidTransaction> {
    let category = Category::parse(&txn.category).ok_or_else(|| {
        LedgerError::validation(format!("unknown category '{}'", txn.category))
    })?;
    if category.kind() != txn.kind {
        return Err(LedgerError::validation(format!(
            "category '{category}' is not valid for {} transactions",
            txn.kind
        )));
    }
    if txn.amount < Decimal::ZERO {
        return Err(LedgerError::validation("amount must not be negative"));
    }
    if txn.description.trim().is_empty() {
        return Err(LedgerError::validation("description is required"));
    }
    let date = txn
        .date
        .ok_or_else(|| LedgerError::validation("date is required"))?;

    match txn.reference.map(|r| r.kind) {
        Some(ReferenceKind::Child) if txn.kind != TransactionType::Income => {
            return Err(LedgerError::validation(
                "only income transactions can reference a child",
            ));
        }
        Some(ReferenceKind::Babysitter) if category != Category::BabysitterSalaries => {
            return Err(LedgerError::validation(
                "only babysitter-salaries transactions can reference a babysitter",
            ));
        }
        _ => {}
    }

    Ok(ValidTransaction {
        category,
        date,
        status: txn
            .status
            .unwrap_or_else(|| TransactionStatus::default_for(category)),
    })
}

pub(crate) struct ValidBudget {
    pub(crate) category: Category,
    pub(crate) period_type: PeriodType,
    pub(crate) start_date: NaiveDate,
}

pub(crate) fn validate_budget(budget: &NewBudget) -> LedgerResult<ValidBudget> {
    let category = Category::parse(&budget.category)
        .filter(|c| Category::budgetable().contains(c))
        .ok_or_else(|| {
            LedgerError::validation(format!("'{}' is not a budget category", budget.category))
        })?;
    let period_type = PeriodType::parse(&budget.period_type).ok_or_else(|| {
        LedgerError::validation(format!(
            "period type must be monthly or weekly, got '{}'",
            budget.period_type
        ))
    })?;
    if budget.amount < Decimal::ZERO {
        return Err(LedgerError::validation("budget amount must not be negative"));
    }
    let start_date = budget
        .start_date
        .ok_or_else(|| LedgerError::validation("start date is required"))?;
    if let Some(end) = budget.end_date {
        if end < start_date {
            return Err(LedgerError::validation(format!(
                "end date {end} is before start date {start_date}"
            )));
        }
    }
    Ok(ValidBudget {
        category,
        period_type,
        start_date,
    })
}

// ── Row mapping ───────────────────────────────────────────────

fn conversion_error(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, msg.into())
}

fn decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(&raw).map_err(|e| conversion_error(idx, format!("amount '{raw}': {e}")))
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT)
        .map_err(|e| conversion_error(idx, format!("date '{raw}': {e}")))
}

fn enum_column<T>(row: &Row<'_>, idx: usize, parse: fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw).ok_or_else(|| conversion_error(idx, format!("unexpected value '{raw}'")))
}

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let reference_id: Option<i64> = row.get(7)?;
    let reference_type: Option<String> = row.get(8)?;
    let reference = match (reference_id, reference_type.as_deref().and_then(ReferenceKind::parse)) {
        (Some(id), Some(kind)) => Some(Reference { kind, id }),
        _ => None,
    };
    Ok(Transaction {
        id: row.get(0)?,
        kind: enum_column(row, 1, TransactionType::parse)?,
        category: enum_column(row, 2, Category::parse)?,
        amount: decimal_column(row, 3)?,
        description: row.get(4)?,
        date: date_column(row, 5)?,
        created_by: row.get(6)?,
        reference,
        status: enum_column(row, 9, TransactionStatus::parse)?,
        created_at: row.get(10)?,
    })
}

fn row_to_budget(row: &Row<'_>) -> rusqlite::Result<Budget> {
    let end_date = match row.get::<_, Option<String>>(5)? {
        Some(_) => Some(date_column(row, 5)?),
        None => None,
    };
    Ok(Budget {
        id: row.get(0)?,
        category: enum_column(row, 1, Category::parse)?,
        amount: decimal_column(row, 2)?,
        period_type: enum_column(row, 3, PeriodType::parse)?,
        start_date: date_column(row, 4)?,
        end_date,
        created_by: row.get(6)?,
        created_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests;
