/// Decoding and validation helpers
///
/// Converts textual option values into Rust enums and validates identifiers
/// that end up interpolated into SQL.
use crate::error::{DriverError, Result};
use crate::models::{ConnectionMode, TransactionBehavior};

/// Decode a mode name like `"local"` or `"remote_replica"`
pub fn decode_mode(name: &str) -> Option<ConnectionMode> {
    match name {
        "remote_replica" => Some(ConnectionMode::RemoteReplica),
        "remote" => Some(ConnectionMode::Remote),
        "local" => Some(ConnectionMode::Local),
        "memory" => Some(ConnectionMode::Memory),
        _ => None,
    }
}

/// Decode a transaction behavior name
///
/// Accepts `deferred`, `immediate`, `exclusive` and `read_only`, case-insensitively.
pub fn decode_transaction_behavior(name: &str) -> Option<TransactionBehavior> {
    match name.to_ascii_lowercase().as_str() {
        "deferred" => Some(TransactionBehavior::Deferred),
        "immediate" => Some(TransactionBehavior::Immediate),
        "exclusive" => Some(TransactionBehavior::Exclusive),
        "read_only" | "readonly" => Some(TransactionBehavior::ReadOnly),
        _ => None,
    }
}

/// Like [`decode_transaction_behavior`], failing with a transaction error
pub fn parse_transaction_behavior(name: &str) -> Result<TransactionBehavior> {
    decode_transaction_behavior(name).ok_or_else(|| {
        DriverError::Transaction(format!(
            "Invalid transaction behavior: {name}. Use deferred, immediate, exclusive, or read_only"
        ))
    })
}

/// Validate that a savepoint name is a valid SQL identifier
///
/// Savepoint names must be:
/// - Non-empty
/// - ASCII alphanumeric or underscore
/// - Not start with a digit
pub fn validate_savepoint_name(name: &str) -> Result<()> {
    if name.is_empty()
        || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        || name.chars().next().is_none_or(|c| c.is_ascii_digit())
    {
        return Err(DriverError::Transaction(format!(
            "Invalid savepoint name {name:?}: must be a valid SQL identifier"
        )));
    }
    Ok(())
}

impl std::str::FromStr for ConnectionMode {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self> {
        decode_mode(s).ok_or_else(|| DriverError::Configuration(format!("Unknown mode: {s}")))
    }
}
