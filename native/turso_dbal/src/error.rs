/// Error taxonomy for the driver adapter
///
/// Every failure reported by the LibSQL client is translated here, at a single
/// point, into one of a fixed set of kinds. The original client message is kept
/// verbatim so callers can still match on SQLite's wording.
use thiserror::Error;

/// Convenience alias used by every public operation in this crate
pub type Result<T, E = DriverError> = std::result::Result<T, E>;

/// Coarse classification of a [`DriverError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Connection,
    Query,
    Transaction,
    NoKeyValue,
}

#[derive(Debug, Error)]
pub enum DriverError {
    /// No usable connection target could be derived from the configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Opening the handle failed, or connection state became unusable
    #[error("Connection error: {0}")]
    Connection(String),

    /// SQL compile or execute failure
    #[error("Query error: {message}")]
    Query {
        message: String,
        sql: Option<String>,
    },

    /// Begin, commit, rollback or savepoint failure
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Key-value fetch on a result with fewer than two columns
    #[error(
        "Fetching as key-value pairs requires the result to contain at least 2 columns, {column_count} given"
    )]
    NoKeyValue { column_count: usize },
}

impl DriverError {
    pub fn connection(context: &str, err: impl std::fmt::Display) -> Self {
        DriverError::Connection(format!("{context}: {err}"))
    }

    pub fn query(err: impl std::fmt::Display, sql: &str) -> Self {
        DriverError::Query {
            message: err.to_string(),
            sql: Some(sql.to_string()),
        }
    }

    pub fn transaction(context: &str, err: impl std::fmt::Display) -> Self {
        DriverError::Transaction(format!("{context}: {err}"))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DriverError::Configuration(_) => ErrorKind::Configuration,
            DriverError::Connection(_) => ErrorKind::Connection,
            DriverError::Query { .. } => ErrorKind::Query,
            DriverError::Transaction(_) => ErrorKind::Transaction,
            DriverError::NoKeyValue { .. } => ErrorKind::NoKeyValue,
        }
    }

    /// The offending SQL text, for query errors that carry one
    pub fn sql(&self) -> Option<&str> {
        match self {
            DriverError::Query { sql, .. } => sql.as_deref(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DriverError {
    fn from(err: serde_json::Error) -> Self {
        DriverError::Configuration(format!("invalid connection config: {err}"))
    }
}
