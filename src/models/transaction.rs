use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum Category {
    ParentPayment,
    ToysAndMaterials,
    Maintenance,
    Utilities,
    BabysitterSalaries,
}

impl Category {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::ParentPayment => "parent-payment",
            Self::ToysAndMaterials => "toys-and-materials",
            Self::Maintenance => "maintenance",
            Self::Utilities => "utilities",
            Self::BabysitterSalaries => "babysitter-salaries",
        }
    }

    /// Accepts the legacy `daycare-fees` name for parent payments.
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "parent-payment" | "daycare-fees" => Some(Self::ParentPayment),
            "toys-and-materials" => Some(Self::ToysAndMaterials),
            "maintenance" => Some(Self::Maintenance),
            "utilities" => Some(Self::Utilities),
            "babysitter-salaries" => Some(Self::BabysitterSalaries),
            _ => None,
        }
    }

    /// The transaction type every entry in this category must carry.
    pub(crate) fn kind(&self) -> TransactionType {
        match self {
            Self::ParentPayment => TransactionType::Income,
            _ => TransactionType::Expense,
        }
    }

    pub(crate) fn all() -> &'static [Category] {
        &[
            Self::ParentPayment,
            Self::ToysAndMaterials,
            Self::Maintenance,
            Self::Utilities,
            Self::BabysitterSalaries,
        ]
    }

    /// Categories a budget can be allocated against.
    pub(crate) fn budgetable() -> &'static [Category] {
        &[
            Self::ToysAndMaterials,
            Self::Maintenance,
            Self::Utilities,
            Self::BabysitterSalaries,
        ]
    }

    pub(crate) fn for_type(kind: TransactionType) -> Vec<Category> {
        Self::all()
            .iter()
            .copied()
            .filter(|c| c.kind() == kind)
            .collect()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum TransactionStatus {
    Pending,
    Completed,
}

impl TransactionStatus {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Salary entries await clearance; manual entries are settled on entry.
    pub(crate) fn default_for(category: Category) -> Self {
        match category {
            Category::BabysitterSalaries => Self::Pending,
            _ => Self::Completed,
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ReferenceKind {
    Child,
    Babysitter,
}

impl ReferenceKind {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Child => "child",
            Self::Babysitter => "babysitter",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "child" => Some(Self::Child),
            "babysitter" => Some(Self::Babysitter),
            _ => None,
        }
    }
}

/// A child or babysitter an entry is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Reference {
    #[serde(rename = "referenceType")]
    pub(crate) kind: ReferenceKind,
    #[serde(rename = "referenceId")]
    pub(crate) id: i64,
}

/// A persisted ledger row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Transaction {
    pub(crate) id: i64,
    #[serde(rename = "type")]
    pub(crate) kind: TransactionType,
    pub(crate) category: Category,
    pub(crate) amount: Decimal,
    pub(crate) description: String,
    pub(crate) date: NaiveDate,
    pub(crate) created_by: Option<i64>,
    #[serde(flatten)]
    pub(crate) reference: Option<Reference>,
    pub(crate) status: TransactionStatus,
    pub(crate) created_at: String,
}

impl Transaction {
    pub(crate) fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }
}

/// Input for [`crate::db::Database::record_transaction`].
#[derive(Debug, Clone)]
pub(crate) struct NewTransaction {
    pub(crate) kind: TransactionType,
    pub(crate) category: String,
    pub(crate) amount: Decimal,
    pub(crate) description: String,
    pub(crate) date: Option<NaiveDate>,
    pub(crate) created_by: Option<i64>,
    pub(crate) reference: Option<Reference>,
    /// `None` picks the category default: pending for salaries, completed
    /// otherwise.
    pub(crate) status: Option<TransactionStatus>,
}

impl NewTransaction {
    pub(crate) fn new(
        kind: TransactionType,
        category: impl Into<String>,
        amount: Decimal,
        description: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            kind,
            category: category.into(),
            amount,
            description: description.into(),
            date: Some(date),
            created_by: None,
            reference: None,
            status: None,
        }
    }

    pub(crate) fn created_by(mut self, user: Option<i64>) -> Self {
        self.created_by = user;
        self
    }

    pub(crate) fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub(crate) fn with_reference(mut self, kind: ReferenceKind, id: i64) -> Self {
        self.reference = Some(Reference { kind, id });
        self
    }
}

/// Conjunctive listing filter; every field is optional.
#[derive(Debug, Clone, Default)]
pub(crate) struct TransactionFilter {
    pub(crate) kind: Option<TransactionType>,
    pub(crate) category: Option<Category>,
    pub(crate) status: Option<TransactionStatus>,
    pub(crate) start_date: Option<NaiveDate>,
    pub(crate) end_date: Option<NaiveDate>,
}

impl TransactionFilter {
    pub(crate) fn of_type(kind: TransactionType) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub(crate) fn between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }
}
