use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::db::Database;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Category, NewTransaction, ReferenceKind, TransactionStatus, TransactionType};

/// Per-child rate for a full-day session, in UGX.
pub(crate) const FULL_DAY_RATE: i64 = 5000;
/// Per-child rate for a half-day session, in UGX.
pub(crate) const HALF_DAY_RATE: i64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum SessionType {
    HalfDay,
    FullDay,
}

impl SessionType {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::HalfDay => "half-day",
            Self::FullDay => "full-day",
        }
    }

    pub(crate) fn parse(s: &str) -> LedgerResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "half-day" => Ok(Self::HalfDay),
            "full-day" => Ok(Self::FullDay),
            _ => Err(LedgerError::invalid_input(format!(
                "session type must be half-day or full-day, got '{s}'"
            ))),
        }
    }

    pub(crate) fn rate(&self) -> Decimal {
        match self {
            Self::FullDay => Decimal::from(FULL_DAY_RATE),
            Self::HalfDay => Decimal::from(HALF_DAY_RATE),
        }
    }
}

impl std::fmt::Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Price of one session: the per-child rate times the children looked after.
pub(crate) fn quote(session: SessionType, children_count: u32) -> Decimal {
    session.rate() * Decimal::from(children_count)
}

/// The children/babysitter directory the ledger reads assignment counts from.
pub(crate) trait Roster {
    /// Number of active children assigned to `babysitter_id` on `date`.
    fn assigned_children(&self, babysitter_id: i64, date: NaiveDate) -> LedgerResult<u32>;
}

/// Roster backed by a fixed babysitter → children-count map.
#[derive(Debug, Clone, Default)]
pub(crate) struct StaticRoster {
    assignments: HashMap<i64, u32>,
}

impl StaticRoster {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn assign(mut self, babysitter_id: i64, children: u32) -> Self {
        self.assignments.insert(babysitter_id, children);
        self
    }
}

impl Roster for StaticRoster {
    fn assigned_children(&self, babysitter_id: i64, _date: NaiveDate) -> LedgerResult<u32> {
        self.assignments
            .get(&babysitter_id)
            .copied()
            .ok_or(LedgerError::NotFound {
                entity: "Babysitter",
                id: babysitter_id,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaymentQuote {
    pub(crate) babysitter_id: i64,
    pub(crate) date: NaiveDate,
    pub(crate) session_type: SessionType,
    pub(crate) children_count: u32,
    pub(crate) rate: Decimal,
    pub(crate) amount: Decimal,
}

impl PaymentQuote {
    pub(crate) fn new(babysitter_id: i64, date: NaiveDate, session_type: SessionType, children_count: u32) -> Self {
        Self {
            babysitter_id,
            date,
            session_type,
            children_count,
            rate: session_type.rate(),
            amount: quote(session_type, children_count),
        }
    }

    fn description(&self) -> String {
        let noun = if self.children_count == 1 { "child" } else { "children" };
        format!(
            "Babysitter payment: {} session, {} {noun}",
            self.session_type, self.children_count
        )
    }
}

/// Quotes a session using the roster's assignment count for that day.
pub(crate) fn calculate_payment(
    roster: &dyn Roster,
    babysitter_id: i64,
    date: NaiveDate,
    session_type: SessionType,
) -> LedgerResult<PaymentQuote> {
    let children = roster.assigned_children(babysitter_id, date)?;
    let quote = PaymentQuote::new(babysitter_id, date, session_type, children);
    debug!(babysitter_id, %date, session = %session_type, children, amount = %quote.amount, "payment quoted");
    Ok(quote)
}

/// Persists a quote as a pending babysitter-salaries expense. This is the only
/// path that creates salary entries.
pub(crate) fn record_payment(db: &Database, quote: &PaymentQuote, created_by: Option<i64>) -> LedgerResult<i64> {
    let txn = NewTransaction::new(
        TransactionType::Expense,
        Category::BabysitterSalaries.as_str(),
        quote.amount,
        quote.description(),
        quote.date,
    )
    .created_by(created_by)
    .with_reference(ReferenceKind::Babysitter, quote.babysitter_id)
    .with_status(TransactionStatus::Pending);

    let id = db.record_transaction(&txn)?;
    info!(id, babysitter_id = quote.babysitter_id, amount = %quote.amount, "babysitter payment recorded");
    Ok(id)
}

#[cfg(test)]
mod tests;
