pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS financial_transactions (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    type            TEXT NOT NULL CHECK (type IN ('income', 'expense')),
    category        TEXT NOT NULL,
    amount          TEXT NOT NULL,
    description     TEXT NOT NULL,
    date            TEXT NOT NULL,
    created_by      INTEGER,
    reference_id    INTEGER,
    reference_type  TEXT CHECK (reference_type IN ('child', 'babysitter')),
    status          TEXT NOT NULL DEFAULT 'completed' CHECK (status IN ('pending', 'completed')),
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_financial_transactions_date ON financial_transactions(date);
CREATE INDEX IF NOT EXISTS idx_financial_transactions_type_category ON financial_transactions(type, category);
CREATE INDEX IF NOT EXISTS idx_financial_transactions_status ON financial_transactions(status);

CREATE TABLE IF NOT EXISTS budgets (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    category     TEXT NOT NULL,
    amount       TEXT NOT NULL,
    period_type  TEXT NOT NULL CHECK (period_type IN ('monthly', 'weekly')),
    start_date   TEXT NOT NULL,
    end_date     TEXT,
    created_by   INTEGER,
    created_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_budgets_period ON budgets(period_type, start_date);
"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[];
