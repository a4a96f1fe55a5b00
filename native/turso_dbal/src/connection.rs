/// Connection lifecycle for LibSQL/Turso databases
///
/// A `Connection` owns exactly one handle and the transaction state that goes
/// with it. Query routing lives in `query`, transaction transitions in
/// `transaction`, savepoints in `savepoint`, counters in `metadata` and
/// replica sync in `replication`; this module holds the struct itself plus
/// preparing, quoting and health checks.
use crate::constants::TOKIO_RUNTIME;
use crate::error::{DriverError, Result};
use crate::models::{ConnectionMode, ExecutionContext, Handle, Session};
use crate::statement::Statement;
use crate::utils::{escape_string, safe_lock_arc};
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

/// A single connection to a LibSQL database.
///
/// All operations block until the underlying client returns. The type is
/// `Send` but not meant for concurrent use: give each worker its own
/// connection.
#[derive(Debug)]
pub struct Connection {
    pub(crate) ctx: ExecutionContext,
}

impl Connection {
    pub(crate) fn new(handle: Handle, mode: ConnectionMode) -> Self {
        let conn_id = Uuid::new_v4().to_string();
        debug!(conn_id = %conn_id, mode = %mode, "connection ready");
        Connection {
            ctx: ExecutionContext {
                mode,
                conn_id,
                session: Arc::new(Mutex::new(Session::new(handle))),
            },
        }
    }

    /// Unique id of this connection, attached to log events
    pub fn id(&self) -> &str {
        &self.ctx.conn_id
    }

    pub fn mode(&self) -> ConnectionMode {
        self.ctx.mode
    }

    /// Prepare a SQL statement.
    ///
    /// The SQL is compiled against the handle so syntax errors surface here,
    /// verbatim from the client. The returned statement starts with no
    /// parameters bound.
    pub fn prepare(&self, sql: &str) -> Result<Statement> {
        let session = self.ctx.session.clone();

        #[allow(clippy::await_holding_lock)]
        let (columns, parameter_names) = TOKIO_RUNTIME.block_on(async {
            let guard = safe_lock_arc(&session, "prepare session")?;
            let stmt = guard
                .executor()
                .prepare(sql)
                .await
                .map_err(|e| DriverError::query(e, sql))?;

            let columns: Vec<String> = stmt
                .columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect();
            let parameter_names: Vec<Option<String>> = (1..=stmt.parameter_count())
                .map(|i| stmt.parameter_name(i as i32).map(str::to_string))
                .collect();
            Ok::<_, DriverError>((columns, parameter_names))
        })?;

        debug!(conn_id = %self.ctx.conn_id, sql, "prepared statement");
        Ok(Statement::new(
            self.ctx.clone(),
            sql.to_string(),
            columns,
            parameter_names,
        ))
    }

    /// Escape a string for manual SQL construction.
    ///
    /// Best-effort MySQL-style backslash escaping without surrounding quotes.
    /// Not dialect-aware and no substitute for bound parameters.
    pub fn quote(&self, value: &str) -> String {
        escape_string(value)
    }

    /// Check that the connection is alive with `SELECT 1`.
    pub fn ping(&self) -> Result<()> {
        self.query("SELECT 1").map(|_| ())
    }

    /// Version of the SQLite engine behind the handle.
    pub fn server_version(&self) -> Result<String> {
        let mut result = self.query("SELECT sqlite_version()")?;
        match result.fetch_one() {
            Some(libsql::Value::Text(version)) => Ok(version),
            other => Err(DriverError::Query {
                message: format!("unexpected sqlite_version() result: {other:?}"),
                sql: Some("SELECT sqlite_version()".to_string()),
            }),
        }
    }

    /// The underlying client connection.
    ///
    /// Statements run on it directly bypass this adapter's transaction
    /// tracking.
    pub fn native_connection(&self) -> Result<libsql::Connection> {
        let guard = safe_lock_arc(&self.ctx.session, "native_connection session")?;
        Ok(guard.handle.client.clone())
    }

    /// Close the connection.
    ///
    /// An open transaction is rolled back first. The handle itself is released
    /// once every statement prepared on this connection has been dropped too.
    pub fn close(self) -> Result<()> {
        if self.in_transaction()? {
            self.rollback()?;
        }
        debug!(conn_id = %self.ctx.conn_id, "connection closed");
        Ok(())
    }
}
