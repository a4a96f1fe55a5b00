//! Error handling tests
//!
//! Every client failure must come back as a `DriverError` of the right kind,
//! with the client's message intact, and never as a panic.
//!
//! Focus areas:
//! 1. Constraint violations (NOT NULL, UNIQUE, FOREIGN KEY, CHECK)
//! 2. Query syntax errors (invalid SQL, non-existent table/column)
//! 3. Transaction misuse
//! 4. Configuration errors

#![allow(clippy::unwrap_used)]

use super::test_utils::{local_connection, memory_connection};
use crate::driver::open_handle;
use crate::error::{DriverError, ErrorKind};
use crate::models::{ConnectionMode, NormalizedParams};
use std::time::Duration;

// ============================================================================
// CONSTRAINT VIOLATION TESTS
// ============================================================================

#[test]
fn test_not_null_constraint_violation() {
    let conn = memory_connection();
    conn.exec("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL)")
        .unwrap();

    let sql = "INSERT INTO users (id) VALUES (1)";
    let err = conn.exec(sql).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Query);
    assert_eq!(err.sql(), Some(sql));
    assert!(err.to_string().contains("NOT NULL"), "got: {err}");
}

#[test]
fn test_unique_constraint_violation() {
    let (_guard, conn) = local_connection("errors");
    conn.exec("CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT UNIQUE)")
        .unwrap();
    conn.exec("INSERT INTO users VALUES (1, 'a@example.com')")
        .unwrap();

    let err = conn
        .query("INSERT INTO users VALUES (2, 'a@example.com')")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Query);
    assert!(err.to_string().contains("UNIQUE"), "got: {err}");
}

#[test]
fn test_foreign_key_constraint_violation() {
    let conn = memory_connection();
    conn.exec("PRAGMA foreign_keys = ON").unwrap();
    conn.exec("CREATE TABLE parent (id INTEGER PRIMARY KEY)").unwrap();
    conn.exec("CREATE TABLE child (id INTEGER, parent_id INTEGER REFERENCES parent(id))")
        .unwrap();

    let err = conn.exec("INSERT INTO child VALUES (1, 99)").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Query);
    assert!(err.to_string().contains("FOREIGN KEY"), "got: {err}");
}

#[test]
fn test_check_constraint_violation() {
    let conn = memory_connection();
    conn.exec("CREATE TABLE products (price REAL CHECK (price > 0))")
        .unwrap();

    let err = conn.exec("INSERT INTO products VALUES (-1)").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Query);
    assert!(err.to_string().contains("CHECK"), "got: {err}");
}

// ============================================================================
// SYNTAX AND SCHEMA ERRORS
// ============================================================================

#[test]
fn test_invalid_sql_syntax() {
    let conn = memory_connection();
    let err = conn.query("SELEKT * FROM nowhere").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Query);
    assert_eq!(err.sql(), Some("SELEKT * FROM nowhere"));
}

#[test]
fn test_missing_table() {
    let conn = memory_connection();
    let err = conn.query("SELECT * FROM missing").unwrap_err();
    assert!(err.to_string().contains("no such table"), "got: {err}");
}

#[test]
fn test_missing_column_on_prepare() {
    let conn = memory_connection();
    conn.exec("CREATE TABLE t (a INTEGER)").unwrap();

    let err = conn.prepare("SELECT b FROM t").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Query);
    assert!(err.to_string().contains("no such column"), "got: {err}");
}

#[test]
fn test_connection_usable_after_error() {
    let conn = memory_connection();
    assert!(conn.exec("NOT SQL AT ALL").is_err());
    assert!(conn.ping().is_ok());
}

// ============================================================================
// TRANSACTION MISUSE
// ============================================================================

#[test]
fn test_double_rollback_is_noop() {
    let conn = memory_connection();
    conn.begin_transaction().unwrap();
    conn.rollback().unwrap();
    assert!(conn.rollback().is_ok());
}

#[test]
fn test_savepoint_after_commit_fails() {
    let conn = memory_connection();
    conn.begin_transaction().unwrap();
    conn.commit().unwrap();

    let err = conn.savepoint("late").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transaction);
}

// ============================================================================
// CONFIGURATION ERRORS
// ============================================================================

fn params(url: Option<&str>) -> NormalizedParams {
    NormalizedParams {
        url: url.map(str::to_string),
        auth_token: None,
        sync_url: None,
        sync_interval: Duration::from_secs(5),
        read_your_writes: true,
        encryption_key: String::new(),
        framework: false,
    }
}

#[test]
fn test_open_handle_missing_required_options() {
    let err = open_handle(ConnectionMode::Local, &params(None)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let err = open_handle(ConnectionMode::Remote, &params(None)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let err = open_handle(ConnectionMode::RemoteReplica, &params(Some("r.db"))).unwrap_err();
    assert!(matches!(err, DriverError::Configuration(ref m) if m.contains("sync_url")));
}

#[test]
fn test_error_kinds_are_distinct() {
    let errors = [
        DriverError::Configuration("c".into()),
        DriverError::Connection("c".into()),
        DriverError::query("boom", "SELECT 1"),
        DriverError::Transaction("t".into()),
        DriverError::NoKeyValue { column_count: 0 },
    ];
    let kinds: std::collections::HashSet<ErrorKind> = errors.iter().map(DriverError::kind).collect();
    assert_eq!(kinds.len(), errors.len());
    assert_eq!(errors[2].sql(), Some("SELECT 1"));
    assert_eq!(errors[0].sql(), None);
}
