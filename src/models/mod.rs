mod budget;
mod transaction;

pub(crate) use budget::{Budget, BudgetState, BudgetStatus, NewBudget, PeriodType};
pub(crate) use transaction::{
    Category, NewTransaction, Reference, ReferenceKind, Transaction, TransactionFilter,
    TransactionStatus, TransactionType,
};
