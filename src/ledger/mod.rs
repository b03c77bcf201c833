//! Time-windowed aggregation over the transaction and budget stores.
//!
//! Every operation resolves its window against the ledger's `today`, pulls
//! matching rows through a [`TransactionFilter`] and sums amounts as exact
//! decimals. An empty window yields zeroed results; store failures propagate.

mod window;

pub(crate) use window::{DateWindow, TimeRange};

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::db::Database;
use crate::error::{LedgerError, LedgerResult};
use crate::util::{add_amounts, sum_amounts};
use crate::models::{
    BudgetStatus, Category, PeriodType, Transaction, TransactionFilter, TransactionStatus,
    TransactionType,
};

/// Pending parent payments older than this many days are overdue.
pub(crate) const OVERDUE_AFTER_DAYS: u64 = 30;

/// Upper bound on the number of windows a trend may span.
pub(crate) const MAX_TREND_PERIODS: usize = 366;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub(crate) struct CategoryTotal {
    pub(crate) total: Decimal,
    pub(crate) count: u64,
}

/// Totals for one transaction type over a window, split by category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TypeSummary {
    #[serde(rename = "type")]
    pub(crate) kind: TransactionType,
    pub(crate) total: Decimal,
    pub(crate) count: u64,
    pub(crate) by_category: BTreeMap<Category, CategoryTotal>,
}

impl TypeSummary {
    fn from_rows(kind: TransactionType, rows: &[Transaction]) -> LedgerResult<Self> {
        let mut by_category: BTreeMap<Category, CategoryTotal> = BTreeMap::new();
        for txn in rows {
            let entry = by_category.entry(txn.category).or_default();
            entry.total = add_amounts(entry.total, txn.amount)?;
            entry.count += 1;
        }
        Ok(Self {
            kind,
            total: sum_amounts(rows.iter().map(|t| t.amount))?,
            count: rows.len() as u64,
            by_category,
        })
    }

    pub(crate) fn category(&self, category: Category) -> CategoryTotal {
        self.by_category.get(&category).cloned().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IncomeVsExpense {
    pub(crate) total_income: Decimal,
    pub(crate) total_expense: Decimal,
    pub(crate) net_income: Decimal,
}

impl IncomeVsExpense {
    fn new(total_income: Decimal, total_expense: Decimal) -> Self {
        Self {
            total_income,
            total_expense,
            net_income: total_income - total_expense,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct CategoryBreakdown {
    pub(crate) income: BTreeMap<Category, CategoryTotal>,
    pub(crate) expense: BTreeMap<Category, CategoryTotal>,
}

/// The dashboard summary: totals, net and per-category figures for a window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FinancialSummary {
    pub(crate) window: DateWindow,
    /// Gross volume: income plus expense.
    pub(crate) total: Decimal,
    pub(crate) transaction_count: u64,
    pub(crate) total_income: Decimal,
    pub(crate) total_expense: Decimal,
    pub(crate) net_income: Decimal,
    pub(crate) by_category: CategoryBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TrendPoint {
    pub(crate) label: String,
    pub(crate) start: NaiveDate,
    pub(crate) end: NaiveDate,
    pub(crate) income: Decimal,
    pub(crate) expense: Decimal,
    pub(crate) net: Decimal,
}

pub(crate) struct Ledger<'a> {
    db: &'a Database,
    today: NaiveDate,
}

impl<'a> Ledger<'a> {
    pub(crate) fn new(db: &'a Database, today: NaiveDate) -> Self {
        Self { db, today }
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.today
    }

    pub(crate) fn window(&self, range: TimeRange) -> LedgerResult<DateWindow> {
        let window = range.window(self.today)?;
        debug!(range = %range, start = %window.start, end = %window.end, "window resolved");
        Ok(window)
    }

    /// All transactions inside the window, newest first.
    pub(crate) fn transactions(&self, range: TimeRange) -> LedgerResult<Vec<Transaction>> {
        let window = self.window(range)?;
        self.db
            .list_transactions(&TransactionFilter::default().between(window.start, window.end))
    }

    pub(crate) fn summarize(&self, kind: TransactionType, range: TimeRange) -> LedgerResult<TypeSummary> {
        let window = self.window(range)?;
        self.summarize_window(kind, &window)
    }

    fn summarize_window(&self, kind: TransactionType, window: &DateWindow) -> LedgerResult<TypeSummary> {
        let rows = self
            .db
            .list_transactions(&TransactionFilter::of_type(kind).between(window.start, window.end))?;
        TypeSummary::from_rows(kind, &rows)
    }

    pub(crate) fn income_vs_expense(&self, range: TimeRange) -> LedgerResult<IncomeVsExpense> {
        let window = self.window(range)?;
        self.income_vs_expense_window(&window)
    }

    fn income_vs_expense_window(&self, window: &DateWindow) -> LedgerResult<IncomeVsExpense> {
        let income = self.summarize_window(TransactionType::Income, window)?;
        let expense = self.summarize_window(TransactionType::Expense, window)?;
        Ok(IncomeVsExpense::new(income.total, expense.total))
    }

    pub(crate) fn financial_summary(&self, range: TimeRange) -> LedgerResult<FinancialSummary> {
        let window = self.window(range)?;
        let income = self.summarize_window(TransactionType::Income, &window)?;
        let expense = self.summarize_window(TransactionType::Expense, &window)?;
        let totals = IncomeVsExpense::new(income.total, expense.total);
        Ok(FinancialSummary {
            window,
            total: add_amounts(income.total, expense.total)?,
            transaction_count: income.count + expense.count,
            total_income: totals.total_income,
            total_expense: totals.total_expense,
            net_income: totals.net_income,
            by_category: CategoryBreakdown {
                income: income.by_category,
                expense: expense.by_category,
            },
        })
    }

    /// Budget-vs-actual for each category with an active monthly budget.
    /// Salary spending counts only cleared (completed) payments; other
    /// categories count every expense in the window. Several active budgets
    /// for one category are added together.
    pub(crate) fn budget_status(&self, range: TimeRange) -> LedgerResult<Vec<BudgetStatus>> {
        let window = self.window(range)?;
        let mut allocations: BTreeMap<Category, Decimal> = BTreeMap::new();
        for budget in self.db.list_active_budgets(self.today, PeriodType::Monthly)? {
            let allocated = allocations.entry(budget.category).or_default();
            *allocated = add_amounts(*allocated, budget.amount)?;
        }

        allocations
            .into_iter()
            .map(|(category, budgeted)| -> LedgerResult<BudgetStatus> {
                let mut filter = TransactionFilter {
                    category: Some(category),
                    ..TransactionFilter::of_type(TransactionType::Expense)
                }
                .between(window.start, window.end);
                if category == Category::BabysitterSalaries {
                    filter.status = Some(TransactionStatus::Completed);
                }
                let actual =
                    sum_amounts(self.db.list_transactions(&filter)?.iter().map(|t| t.amount))?;
                Ok(BudgetStatus::new(category, budgeted, actual))
            })
            .collect()
    }

    /// Pending parent payments dated more than [`OVERDUE_AFTER_DAYS`] days
    /// before `as_of`, oldest first.
    pub(crate) fn overdue_payments(&self, as_of: NaiveDate) -> LedgerResult<Vec<Transaction>> {
        let cutoff = as_of
            .checked_sub_days(Days::new(OVERDUE_AFTER_DAYS))
            .and_then(|d| d.pred_opt())
            .ok_or_else(|| LedgerError::invalid_input(format!("no overdue cutoff before {as_of}")))?;
        let mut rows = self.db.list_transactions(&TransactionFilter {
            kind: Some(TransactionType::Income),
            category: Some(Category::ParentPayment),
            status: Some(TransactionStatus::Pending),
            end_date: Some(cutoff),
            ..TransactionFilter::default()
        })?;
        rows.reverse();
        Ok(rows)
    }

    /// Income and expense for the last `periods` windows, oldest first.
    pub(crate) fn trend(&self, range: TimeRange, periods: usize) -> LedgerResult<Vec<TrendPoint>> {
        if periods > MAX_TREND_PERIODS {
            return Err(LedgerError::invalid_input(format!(
                "trend covers at most {MAX_TREND_PERIODS} periods, got {periods}"
            )));
        }
        range
            .trailing_windows(self.today, periods)?
            .into_iter()
            .map(|window| -> LedgerResult<TrendPoint> {
                let totals = self.income_vs_expense_window(&window)?;
                Ok(TrendPoint {
                    label: window.label,
                    start: window.start,
                    end: window.end,
                    income: totals.total_income,
                    expense: totals.total_expense,
                    net: totals.net_income,
                })
            })
            .collect()
    }
}
