/// Utility functions and helpers for TursoDbal
///
/// This module provides commonly used helper functions for locking, string
/// escaping, row collection and replica sync.
use crate::error::{DriverError, Result};
use libsql::{Rows, Value};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Safely lock an Arc<Mutex<T>> with proper error handling
///
/// Returns a descriptive error message if the mutex is poisoned.
pub fn safe_lock_arc<'a, T>(arc_mutex: &'a Arc<Mutex<T>>, context: &str) -> Result<MutexGuard<'a, T>> {
    arc_mutex
        .lock()
        .map_err(|e| DriverError::Connection(format!("Arc mutex poisoned in {context}: {e}")))
}

/// Perform sync with timeout for remote replicas
///
/// Pulls new frames from the primary, bounded by `timeout_secs`.
pub async fn sync_with_timeout(db: &libsql::Database, timeout_secs: u64) -> Result<()> {
    let timeout = Duration::from_secs(timeout_secs);

    tokio::time::timeout(timeout, db.sync())
        .await
        .map_err(|_| DriverError::Connection(format!("Sync timeout after {timeout_secs} seconds")))?
        .map_err(|e| DriverError::connection("Sync error", e))?;

    Ok(())
}

/// Rows drained from a client row set
#[derive(Debug, Default)]
pub struct CollectedRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Drain a query's row set into memory
///
/// Column names come from the row set itself, so an empty result still
/// reports its columns. Unnamed columns are called `col{i}`. Client failures
/// while stepping or reading go through `on_error`.
pub async fn collect_rows(
    mut rows: Rows,
    on_error: impl Fn(libsql::Error) -> DriverError,
) -> Result<CollectedRows> {
    let column_count = usize::try_from(rows.column_count()).unwrap_or(0);
    let columns: Vec<String> = (0..column_count)
        .map(|i| {
            rows.column_name(i as i32)
                .map_or_else(|| format!("col{i}"), str::to_string)
        })
        .collect();

    let mut collected = Vec::new();
    while let Some(row) = rows.next().await.map_err(&on_error)? {
        let values = (0..column_count)
            .map(|i| row.get::<Value>(i as i32))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(&on_error)?;
        collected.push(values);
    }

    Ok(CollectedRows {
        columns,
        rows: collected,
    })
}

/// Backslash-escape a string for manual SQL construction
///
/// Uses the MySQL escaping table: backslash, NUL, newline, carriage return,
/// Ctrl-Z, single and double quote. No surrounding quotes are added and no
/// dialect-specific rules apply; bind parameters instead where possible.
pub fn escape_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + value.len() / 8);
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\0' => escaped.push_str("\\0"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\x1a' => escaped.push_str("\\Z"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Textual form of a value when it is used as a map key
///
/// NULL becomes the empty string; blobs are decoded lossily as UTF-8.
pub fn value_key(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => String::from_utf8_lossy(b).into_owned(),
    }
}
