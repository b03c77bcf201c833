use thiserror::Error;

/// Failures surfaced by the ledger stores, the aggregation engine and the
/// report exporter.
#[derive(Error, Debug)]
pub(crate) enum LedgerError {
    /// Input that breaks a ledger rule (bad type/category pairing, negative
    /// amount, missing description, inverted budget dates).
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// Unsupported enum value (format, session type, time range).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] rusqlite::Error),

    #[error("Export error: {0}")]
    Export(String),
}

impl LedgerError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub(crate) fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

pub(crate) type LedgerResult<T> = Result<T, LedgerError>;
