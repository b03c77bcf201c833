use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use super::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum PeriodType {
    Monthly,
    Weekly,
}

impl PeriodType {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Weekly => "weekly",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "monthly" => Some(Self::Monthly),
            "weekly" => Some(Self::Weekly),
            _ => None,
        }
    }
}

impl std::fmt::Display for PeriodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Budget {
    pub(crate) id: i64,
    pub(crate) category: Category,
    pub(crate) amount: Decimal,
    pub(crate) period_type: PeriodType,
    pub(crate) start_date: NaiveDate,
    /// `None` means open-ended.
    pub(crate) end_date: Option<NaiveDate>,
    pub(crate) created_by: Option<i64>,
    pub(crate) created_at: String,
}

impl Budget {
    pub(crate) fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && self.end_date.map_or(true, |end| date <= end)
    }
}

/// Input for [`crate::db::Database::create_budget`]. Enum-valued fields stay
/// raw so the store can reject them with a validation error.
#[derive(Debug, Clone)]
pub(crate) struct NewBudget {
    pub(crate) category: String,
    pub(crate) amount: Decimal,
    pub(crate) period_type: String,
    pub(crate) start_date: Option<NaiveDate>,
    pub(crate) end_date: Option<NaiveDate>,
    pub(crate) created_by: Option<i64>,
}

impl NewBudget {
    pub(crate) fn monthly(category: impl Into<String>, amount: Decimal, start: NaiveDate) -> Self {
        Self {
            category: category.into(),
            amount,
            period_type: PeriodType::Monthly.as_str().to_string(),
            start_date: Some(start),
            end_date: None,
            created_by: None,
        }
    }

    pub(crate) fn ending(mut self, end: NaiveDate) -> Self {
        self.end_date = Some(end);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum BudgetState {
    Normal,
    Exceeded,
}

impl BudgetState {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Exceeded => "exceeded",
        }
    }
}

/// Budget-vs-actual for one category over a window. Computed on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BudgetStatus {
    pub(crate) category: Category,
    #[serde(rename = "budget")]
    pub(crate) budgeted_amount: Decimal,
    pub(crate) actual_spending: Decimal,
    pub(crate) status: BudgetState,
}

impl BudgetStatus {
    /// Spending equal to the allocation is still within budget.
    pub(crate) fn new(category: Category, budgeted_amount: Decimal, actual_spending: Decimal) -> Self {
        let status = if actual_spending > budgeted_amount {
            BudgetState::Exceeded
        } else {
            BudgetState::Normal
        };
        Self {
            category,
            budgeted_amount,
            actual_spending,
            status,
        }
    }

    /// Share of the allocation spent, rounded for display. `None` for a zero
    /// allocation or a share too large to represent.
    pub(crate) fn utilization_percent(&self) -> Option<i64> {
        if self.budgeted_amount.is_zero() {
            return None;
        }
        self.actual_spending
            .checked_mul(Decimal::ONE_HUNDRED)?
            .checked_div(self.budgeted_amount)?
            .round()
            .to_i64()
    }
}
