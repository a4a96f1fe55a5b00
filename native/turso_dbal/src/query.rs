/// Statement routing and direct execution
///
/// Every statement, whether issued through `Connection::query`,
/// `Connection::exec` or a prepared `Statement`, ends up here. Statements run
/// on the active transaction's connection when one is open and on the bare
/// handle otherwise.
///
/// `run` sends every statement through the client's query path exactly once
/// and drains whatever it returns. Whether a result carries rows is decided by
/// the statement itself, not by its text: a statement without result columns
/// (INSERT, UPDATE, DDL, ...) yields an empty `QueryResult` carrying the
/// affected-row count instead.
///
/// **Note on Locking**: The session lock is held across await points in
/// async blocks because client futures borrow from the guarded connection.
/// This is safe because every call goes through `TOKIO_RUNTIME.block_on()`,
/// which runs the whole block to completion.
use crate::connection::Connection;
use crate::constants::TOKIO_RUNTIME;
use crate::error::{DriverError, Result};
use crate::models::ExecutionContext;
use crate::result::QueryResult;
use crate::utils::{collect_rows, safe_lock_arc};
use libsql::params::Params;
use tracing::debug;

/// Client failures inside an open transaction are reported as transaction
/// errors, everything else as query errors.
fn statement_error(in_transaction: bool, err: libsql::Error, sql: &str) -> DriverError {
    if in_transaction {
        DriverError::Transaction(format!("Statement failed in transaction: {err} (sql: {sql})"))
    } else {
        DriverError::query(err, sql)
    }
}

impl ExecutionContext {
    /// Run a statement and materialize whatever it returns.
    pub(crate) fn run(&self, sql: &str, params: Params) -> Result<QueryResult> {
        #[allow(clippy::await_holding_lock)]
        TOKIO_RUNTIME.block_on(async {
            let guard = safe_lock_arc(&self.session, "run session")?;
            let in_transaction = guard.in_transaction();
            let executor = guard.executor();
            debug!(conn_id = %self.conn_id, in_transaction, sql, "running statement");

            let rows = executor
                .query(sql, params)
                .await
                .map_err(|e| statement_error(in_transaction, e, sql))?;
            let collected =
                collect_rows(rows, |e| statement_error(in_transaction, e, sql)).await?;

            if collected.columns.is_empty() {
                Ok(QueryResult::from_affected(executor.changes(), self.mode))
            } else {
                Ok(QueryResult::from_rows(collected, self.mode))
            }
        })
    }

    /// Run a statement for its side effect only and return its change count.
    pub(crate) fn execute(&self, sql: &str, params: Params) -> Result<u64> {
        #[allow(clippy::await_holding_lock)]
        TOKIO_RUNTIME.block_on(async {
            let guard = safe_lock_arc(&self.session, "execute session")?;
            let in_transaction = guard.in_transaction();
            debug!(conn_id = %self.conn_id, in_transaction, sql, "executing statement");

            guard
                .executor()
                .execute(sql, params)
                .await
                .map_err(|e| statement_error(in_transaction, e, sql))
        })
    }
}

impl Connection {
    /// Run `sql` and return its result.
    ///
    /// Statements without result columns (INSERT, UPDATE, DDL, ...) are
    /// executed exactly once and produce an empty result whose `row_count()`
    /// is the number of affected rows.
    pub fn query(&self, sql: &str) -> Result<QueryResult> {
        self.ctx.run(sql, Params::None)
    }

    /// Execute `sql` for its side effect.
    ///
    /// Returns the number of rows changed by this statement alone.
    pub fn exec(&self, sql: &str) -> Result<u64> {
        self.ctx.execute(sql, Params::None)
    }
}
