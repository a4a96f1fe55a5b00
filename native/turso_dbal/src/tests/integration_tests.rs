//! Integration tests with real memory and file databases
//!
//! These go through the public `Connection` API end to end: routing of
//! `query`/`exec`, transaction state, savepoints, counters and metadata.

#![allow(clippy::unwrap_used)]

use super::test_utils::{
    local_connection, memory_connection, setup_test_db_with_prefix, users_connection, TestDbGuard,
};
use crate::error::ErrorKind;
use crate::models::{ConnectionMode, TransactionBehavior};
use crate::{connect, ConnectionConfig, Value};

fn count_users(conn: &crate::Connection) -> i64 {
    let mut result = conn.query("SELECT COUNT(*) FROM users").unwrap();
    match result.fetch_one() {
        Some(Value::Integer(n)) => n,
        other => panic!("unexpected count: {other:?}"),
    }
}

mod routing {
    use super::*;

    #[test]
    fn test_query_insert_executes_once() {
        let conn = users_connection();

        let result = conn
            .query("INSERT INTO users (name) VALUES ('Alice')")
            .unwrap();

        assert_eq!(result.row_count(), 1);
        assert_eq!(result.column_count(), 0);
        assert_eq!(count_users(&conn), 1);
    }

    #[test]
    fn test_query_select_materializes_rows() {
        let conn = users_connection();
        conn.exec("INSERT INTO users (name) VALUES ('Alice'), ('Bob')")
            .unwrap();

        let mut result = conn.query("SELECT id, name FROM users ORDER BY id").unwrap();
        assert_eq!(result.mode(), ConnectionMode::Memory);
        assert_eq!(result.column_names(), ["id", "name"]);
        assert_eq!(result.row_count(), 2);

        let rows = result.fetch_all_numeric();
        assert_eq!(rows.len(), 2);
        assert!(matches!(&rows[1][1], Value::Text(s) if s == "Bob"));
    }

    #[test]
    fn test_query_empty_select_keeps_columns() {
        let conn = users_connection();
        let mut result = conn.query("SELECT id, name FROM users").unwrap();

        assert_eq!(result.row_count(), 0);
        assert_eq!(result.column_count(), 2);
        assert!(result.fetch_numeric().is_none());
    }

    #[test]
    fn test_query_returning_produces_rows() {
        let conn = users_connection();
        let mut result = conn
            .query("INSERT INTO users (id, name) VALUES (7, 'Carol') RETURNING id")
            .unwrap();

        assert!(matches!(result.fetch_one(), Some(Value::Integer(7))));
        assert_eq!(count_users(&conn), 1);
    }

    #[test]
    fn test_query_with_cte() {
        let conn = memory_connection();
        let mut result = conn
            .query("WITH nums(n) AS (VALUES (1), (2), (3)) SELECT SUM(n) FROM nums")
            .unwrap();
        assert!(matches!(result.fetch_one(), Some(Value::Integer(6))));
    }

    #[test]
    fn test_query_select_without_spacing() {
        let conn = users_connection();
        conn.exec("INSERT INTO users (name) VALUES ('Alice')").unwrap();

        let result = conn.query("SELECT*FROM users").unwrap();
        assert_eq!(result.row_count(), 1);
        assert_eq!(result.column_names(), ["id", "name"]);

        let mut result = conn.query("SELECT(1)").unwrap();
        assert!(matches!(result.fetch_one(), Some(Value::Integer(1))));
    }

    #[test]
    fn test_query_with_leading_comments() {
        let conn = memory_connection();

        let mut result = conn.query("/* tag */ SELECT 1").unwrap();
        assert!(matches!(result.fetch_one(), Some(Value::Integer(1))));

        let mut result = conn.query("-- note\nSELECT 'x' AS v").unwrap();
        assert_eq!(result.column_names(), ["v"]);
        assert!(matches!(result.fetch_one(), Some(Value::Text(s)) if s == "x"));
    }

    #[test]
    fn test_query_cte_insert_reports_affected_rows() {
        let conn = users_connection();

        let result = conn
            .query(
                "WITH src(n) AS (VALUES ('a'), ('b')) INSERT INTO users (name) SELECT n FROM src",
            )
            .unwrap();

        assert_eq!(result.column_count(), 0);
        assert_eq!(result.row_count(), 2);
        assert_eq!(count_users(&conn), 2);
    }

    #[test]
    fn test_query_constraint_violation_is_query_error() {
        let conn = users_connection();
        conn.exec("INSERT INTO users (id, name) VALUES (1, 'Alice')")
            .unwrap();

        let err = conn
            .query("INSERT INTO users (id, name) VALUES (1, 'Again')")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Query);
        assert_eq!(count_users(&conn), 1);
    }

    #[test]
    fn test_exec_returns_changes() {
        let conn = users_connection();
        conn.exec("INSERT INTO users (name) VALUES ('a'), ('b'), ('c')")
            .unwrap();

        assert_eq!(conn.exec("UPDATE users SET name = 'z'").unwrap(), 3);
        assert_eq!(conn.exec("DELETE FROM users WHERE id = 1").unwrap(), 1);
        assert_eq!(conn.exec("DELETE FROM users WHERE id = 1").unwrap(), 0);
    }
}

mod transactions {
    use super::*;

    #[test]
    fn test_rollback_discards_writes() {
        let conn = users_connection();

        conn.begin_transaction().unwrap();
        assert!(conn.in_transaction().unwrap());
        conn.exec("INSERT INTO users (name) VALUES ('Alice')").unwrap();
        assert_eq!(conn.last_insert_id().unwrap(), 1);
        assert_eq!(count_users(&conn), 1);
        conn.rollback().unwrap();

        assert!(!conn.in_transaction().unwrap());
        assert_eq!(count_users(&conn), 0);
    }

    #[test]
    fn test_commit_keeps_writes() {
        let conn = users_connection();

        conn.begin_transaction().unwrap();
        conn.exec("INSERT INTO users (name) VALUES ('Alice')").unwrap();
        conn.commit().unwrap();

        assert_eq!(count_users(&conn), 1);
    }

    #[test]
    fn test_commit_and_rollback_without_transaction_are_noops() {
        let conn = users_connection();

        conn.begin_transaction().unwrap();
        conn.commit().unwrap();
        conn.commit().unwrap();
        conn.rollback().unwrap();

        assert!(!conn.in_transaction().unwrap());
    }

    #[test]
    fn test_begin_while_active_fails_and_keeps_transaction() {
        let conn = users_connection();

        conn.begin_transaction().unwrap();
        conn.exec("INSERT INTO users (name) VALUES ('Alice')").unwrap();

        let err = conn.begin_transaction().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transaction);
        assert!(conn.in_transaction().unwrap());

        conn.rollback().unwrap();
        assert_eq!(count_users(&conn), 0);
    }

    #[test]
    fn test_begin_again_after_commit() {
        let conn = users_connection();

        conn.begin_transaction().unwrap();
        conn.commit().unwrap();
        conn.begin_transaction().unwrap();
        conn.exec("INSERT INTO users (name) VALUES ('Bob')").unwrap();
        conn.commit().unwrap();

        assert_eq!(count_users(&conn), 1);
    }

    #[test]
    fn test_prepared_statement_follows_transaction_state() {
        let conn = users_connection();
        let mut stmt = conn.prepare("INSERT INTO users (name) VALUES (?)").unwrap();

        conn.begin_transaction().unwrap();
        stmt.bind(1, "inside");
        stmt.execute().unwrap();
        conn.rollback().unwrap();

        stmt.bind(1, "outside");
        stmt.execute().unwrap();

        let mut result = conn.query("SELECT name FROM users").unwrap();
        let names = result.fetch_first_column();
        assert_eq!(names.len(), 1);
        assert!(matches!(&names[0], Value::Text(s) if s == "outside"));
    }

    #[test]
    fn test_immediate_behavior() {
        let conn = users_connection();

        conn.begin_transaction_with_behavior(TransactionBehavior::Immediate)
            .unwrap();
        assert!(!conn.is_autocommit().unwrap());
        conn.exec("INSERT INTO users (name) VALUES ('x')").unwrap();
        conn.commit().unwrap();

        assert!(conn.is_autocommit().unwrap());
        assert_eq!(count_users(&conn), 1);
    }

    #[test]
    fn test_failed_commit_follows_engine_state() {
        let conn = memory_connection();
        conn.exec("PRAGMA foreign_keys = ON").unwrap();
        conn.exec("CREATE TABLE parent (id INTEGER PRIMARY KEY)").unwrap();
        conn.exec(
            "CREATE TABLE child (id INTEGER, parent_id INTEGER \
             REFERENCES parent(id) DEFERRABLE INITIALLY DEFERRED)",
        )
        .unwrap();

        conn.begin_transaction().unwrap();
        conn.exec("INSERT INTO child VALUES (1, 99)").unwrap();

        let err = conn.commit().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transaction);
        assert_eq!(
            conn.in_transaction().unwrap(),
            !conn.is_autocommit().unwrap()
        );

        if conn.in_transaction().unwrap() {
            conn.rollback().unwrap();
        }
        assert!(!conn.in_transaction().unwrap());

        let mut result = conn.query("SELECT COUNT(*) FROM child").unwrap();
        assert!(matches!(result.fetch_one(), Some(Value::Integer(0))));
    }

    #[test]
    fn test_statement_failure_in_transaction_is_transaction_error() {
        let conn = users_connection();

        conn.begin_transaction().unwrap();
        conn.exec("INSERT INTO users (id, name) VALUES (1, 'a')").unwrap();
        let err = conn
            .exec("INSERT INTO users (id, name) VALUES (1, 'b')")
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Transaction);
        assert!(err.to_string().contains("UNIQUE"));
        assert!(conn.in_transaction().unwrap());
        conn.rollback().unwrap();
    }

    #[test]
    fn test_query_failure_in_transaction_is_transaction_error() {
        let conn = users_connection();

        conn.begin_transaction().unwrap();
        conn.query("INSERT INTO users (id, name) VALUES (1, 'a')").unwrap();
        let err = conn
            .query("INSERT INTO users (id, name) VALUES (1, 'b') RETURNING id")
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Transaction);
        assert!(conn.in_transaction().unwrap());
        conn.rollback().unwrap();
        assert_eq!(count_users(&conn), 0);
    }

    #[test]
    fn test_close_rolls_back_open_transaction() {
        let (guard, conn) = local_connection("close");
        conn.exec("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")
            .unwrap();
        conn.begin_transaction().unwrap();
        conn.exec("INSERT INTO users (name) VALUES ('lost')").unwrap();
        conn.close().unwrap();

        let config = ConnectionConfig::local(guard.path().to_string_lossy().into_owned());
        let reopened = connect(&config).unwrap();
        assert_eq!(count_users(&reopened), 0);
    }
}

mod savepoints {
    use super::*;

    #[test]
    fn test_rollback_to_savepoint_keeps_outer_work() {
        let conn = users_connection();

        conn.begin_transaction().unwrap();
        conn.exec("INSERT INTO users (name) VALUES ('kept')").unwrap();
        conn.savepoint("sp1").unwrap();
        conn.exec("INSERT INTO users (name) VALUES ('undone')").unwrap();
        conn.rollback_to_savepoint("sp1").unwrap();
        conn.release_savepoint("sp1").unwrap();
        conn.commit().unwrap();

        assert_eq!(count_users(&conn), 1);
    }

    #[test]
    fn test_release_savepoint_keeps_changes() {
        let conn = users_connection();

        conn.begin_transaction().unwrap();
        conn.savepoint("outer").unwrap();
        conn.exec("INSERT INTO users (name) VALUES ('a')").unwrap();
        conn.savepoint("inner").unwrap();
        conn.exec("INSERT INTO users (name) VALUES ('b')").unwrap();
        conn.release_savepoint("inner").unwrap();
        conn.release_savepoint("outer").unwrap();
        conn.commit().unwrap();

        assert_eq!(count_users(&conn), 2);
    }

    #[test]
    fn test_savepoint_requires_transaction() {
        let conn = users_connection();
        let err = conn.savepoint("sp1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transaction);
    }

    #[test]
    fn test_savepoint_rejects_bad_names() {
        let conn = users_connection();
        conn.begin_transaction().unwrap();

        let err = conn.savepoint("x; DROP TABLE users").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transaction);

        conn.rollback().unwrap();
        assert_eq!(count_users(&conn), 0);
    }

    #[test]
    fn test_unknown_savepoint_is_transaction_error() {
        let conn = users_connection();
        conn.begin_transaction().unwrap();

        let err = conn.release_savepoint("missing").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transaction);
        conn.rollback().unwrap();
    }
}

mod metadata {
    use super::*;

    #[test]
    fn test_last_insert_rowid() {
        let conn = users_connection();
        conn.exec("INSERT INTO users (id, name) VALUES (42, 'x')")
            .unwrap();
        assert_eq!(conn.last_insert_rowid().unwrap(), 42);
    }

    #[test]
    fn test_changes_and_total_changes() {
        let conn = users_connection();
        conn.exec("INSERT INTO users (name) VALUES ('a'), ('b')")
            .unwrap();
        assert_eq!(conn.changes().unwrap(), 2);
        assert_eq!(conn.last_insert_id().unwrap(), 2);

        conn.exec("DELETE FROM users WHERE id = 1").unwrap();
        assert_eq!(conn.changes().unwrap(), 1);
        assert!(conn.total_changes().unwrap() >= 3);
    }

    #[test]
    fn test_server_version() {
        let conn = memory_connection();
        let version = conn.server_version().unwrap();
        assert!(version.starts_with("3."), "unexpected version {version}");
    }

    #[test]
    fn test_native_connection_shares_database() {
        let conn = users_connection();
        let native = conn.native_connection().unwrap();
        crate::constants::TOKIO_RUNTIME
            .block_on(native.execute("INSERT INTO users (name) VALUES ('raw')", ()))
            .unwrap();

        assert_eq!(count_users(&conn), 1);
    }

    #[test]
    fn test_sync_is_noop_outside_replicas() {
        let conn = memory_connection();
        assert!(conn.sync().is_ok());
        assert_eq!(conn.replication_index().unwrap(), 0);
    }

    #[test]
    fn test_quote() {
        let conn = memory_connection();
        assert_eq!(conn.quote("O'Reilly"), r"O\'Reilly");
        assert_eq!(conn.quote(r"back\slash"), r"back\\slash");
        assert_eq!(conn.quote("plain"), "plain");
    }
}

mod local_files {
    use super::*;

    #[test]
    fn test_data_persists_across_connections() {
        let (guard, conn) = local_connection("persist");
        conn.exec("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")
            .unwrap();
        conn.exec("INSERT INTO users (name) VALUES ('Alice')").unwrap();
        conn.close().unwrap();

        let config = ConnectionConfig::local(guard.path().to_string_lossy().into_owned());
        let reopened = connect(&config).unwrap();
        assert_eq!(reopened.mode(), ConnectionMode::Local);
        assert_eq!(count_users(&reopened), 1);
    }

    #[test]
    fn test_encrypted_database_round_trip() {
        let db_path = setup_test_db_with_prefix("encrypted");
        let _guard = TestDbGuard::new(db_path.clone());
        let config = ConnectionConfig::local(db_path.to_string_lossy().into_owned())
            .with_encryption_key("correct horse battery staple");

        let conn = connect(&config).unwrap();
        conn.exec("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")
            .unwrap();
        conn.exec("INSERT INTO users (name) VALUES ('secret')").unwrap();
        conn.close().unwrap();

        let reopened = connect(&config).unwrap();
        assert_eq!(count_users(&reopened), 1);
    }
}
