/// Savepoint management for nested transactions
///
/// Savepoints allow partial rollback inside the active transaction without
/// aborting it. They require a transaction begun with `begin_transaction`.
///
/// # Savepoint Name Rules
/// - Must not be empty
/// - Must contain only ASCII alphanumeric characters and underscores
/// - Must not start with a digit
use crate::connection::Connection;
use crate::constants::TOKIO_RUNTIME;
use crate::decode::validate_savepoint_name;
use crate::error::{DriverError, Result};
use crate::models::TransactionState;
use crate::utils::safe_lock_arc;
use tracing::debug;

impl Connection {
    /// Create a savepoint within the active transaction.
    pub fn savepoint(&self, name: &str) -> Result<()> {
        self.savepoint_statement(name, &format!("SAVEPOINT {name}"), "Savepoint failed")
    }

    /// Release a savepoint, keeping its changes inside the transaction.
    pub fn release_savepoint(&self, name: &str) -> Result<()> {
        self.savepoint_statement(
            name,
            &format!("RELEASE SAVEPOINT {name}"),
            "Release savepoint failed",
        )
    }

    /// Undo everything since the savepoint was created.
    ///
    /// The savepoint stays in place and can be released or rolled back to again.
    pub fn rollback_to_savepoint(&self, name: &str) -> Result<()> {
        self.savepoint_statement(
            name,
            &format!("ROLLBACK TO SAVEPOINT {name}"),
            "Rollback to savepoint failed",
        )
    }

    fn savepoint_statement(&self, name: &str, sql: &str, context: &str) -> Result<()> {
        validate_savepoint_name(name)?;

        #[allow(clippy::await_holding_lock)]
        TOKIO_RUNTIME.block_on(async {
            let guard = safe_lock_arc(&self.ctx.session, "savepoint session")?;

            let TransactionState::Active(txn) = &guard.transaction else {
                return Err(DriverError::Transaction(format!(
                    "{context}: no active transaction"
                )));
            };

            txn.conn
                .execute(sql, ())
                .await
                .map_err(|e| DriverError::transaction(context, e))?;

            debug!(conn_id = %self.ctx.conn_id, savepoint = name, sql, "savepoint statement");
            Ok(())
        })
    }
}
