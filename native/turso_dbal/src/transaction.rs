/// Transaction management for a `Connection`.
///
/// Transactions are opened with the client's own API
/// (`transaction_with_behavior`) and finished with `commit()` / `rollback()`
/// on the returned `libsql::Transaction`. The state machine is
/// `Idle -> Active -> Idle`:
/// - `begin_transaction` moves Idle to Active and fails if a transaction is
///   already active, leaving it untouched
/// - `commit` / `rollback` move Active to Idle when the client reports
///   success. On failure the transaction stays Active as long as the engine
///   still has it open, so the caller can retry or roll back
/// - `commit` / `rollback` while Idle are no-ops
///
/// While Active, every statement issued through the connection or its
/// prepared statements runs on the transaction's connection.
///
/// **Note on Locking**: The session lock is held across await points in
/// async blocks. This is safe because every call goes through
/// `TOKIO_RUNTIME.block_on()`, which runs the whole block to completion.
use crate::connection::Connection;
use crate::constants::TOKIO_RUNTIME;
use crate::error::{DriverError, Result};
use crate::models::{TransactionBehavior, TransactionState, TxnHandle};
use crate::utils::safe_lock_arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Finish {
    Commit,
    Rollback,
}

impl Finish {
    fn label(self) -> &'static str {
        match self {
            Finish::Commit => "Commit",
            Finish::Rollback => "Rollback",
        }
    }

    /// Statement for a transaction the client already consumed
    fn sql(self) -> &'static str {
        match self {
            Finish::Commit => "COMMIT",
            Finish::Rollback => "ROLLBACK",
        }
    }
}

impl Connection {
    /// Begin a new transaction with the default DEFERRED behavior.
    pub fn begin_transaction(&self) -> Result<()> {
        self.begin_transaction_with_behavior(TransactionBehavior::Deferred)
    }

    /// Begin a new transaction with specific locking behavior.
    ///
    /// - `Deferred` - Acquire locks only when needed (default, recommended)
    /// - `Immediate` - Acquire write lock immediately
    /// - `Exclusive` - Exclusive lock, blocks all other connections
    /// - `ReadOnly` - No writes allowed
    pub fn begin_transaction_with_behavior(&self, behavior: TransactionBehavior) -> Result<()> {
        #[allow(clippy::await_holding_lock)]
        TOKIO_RUNTIME.block_on(async {
            let mut guard = safe_lock_arc(&self.ctx.session, "begin_transaction session")?;

            if guard.in_transaction() {
                warn!(conn_id = %self.ctx.conn_id, "begin_transaction while a transaction is active");
                return Err(DriverError::Transaction(
                    "A transaction is already active on this connection".to_string(),
                ));
            }

            debug!(conn_id = %self.ctx.conn_id, "beginning transaction");
            let txn = guard
                .handle
                .client
                .transaction_with_behavior(behavior)
                .await
                .map_err(|e| DriverError::transaction("Begin failed", e))?;

            guard.transaction = TransactionState::Active(TxnHandle::new(txn));
            debug!(conn_id = %self.ctx.conn_id, "transaction started");
            Ok(())
        })
    }

    /// Commit the active transaction; no-op when none is active.
    pub fn commit(&self) -> Result<()> {
        self.finish_transaction(Finish::Commit)
    }

    /// Roll back the active transaction; no-op when none is active.
    pub fn rollback(&self) -> Result<()> {
        self.finish_transaction(Finish::Rollback)
    }

    /// Whether a transaction is currently active.
    pub fn in_transaction(&self) -> Result<bool> {
        let guard = safe_lock_arc(&self.ctx.session, "in_transaction session")?;
        Ok(guard.in_transaction())
    }

    fn finish_transaction(&self, finish: Finish) -> Result<()> {
        #[allow(clippy::await_holding_lock)]
        TOKIO_RUNTIME.block_on(async {
            let mut guard = safe_lock_arc(&self.ctx.session, "finish_transaction session")?;

            let TransactionState::Active(mut handle) = std::mem::take(&mut guard.transaction)
            else {
                return Ok(());
            };

            let outcome = match (handle.txn.take(), finish) {
                (Some(txn), Finish::Commit) => txn.commit().await,
                (Some(txn), Finish::Rollback) => txn.rollback().await,
                (None, _) => handle.conn.execute(finish.sql(), ()).await.map(|_| ()),
            };

            let Err(e) = outcome else {
                // NOTE: LibSQL syncs committed writes of embedded replicas to the
                // primary on its own.
                debug!(conn_id = %self.ctx.conn_id, action = finish.label(), "transaction finished");
                return Ok(());
            };

            if handle.conn.is_autocommit() {
                warn!(
                    conn_id = %self.ctx.conn_id,
                    error = %e,
                    "{} failed, transaction already ended by the engine",
                    finish.label()
                );
            } else {
                warn!(
                    conn_id = %self.ctx.conn_id,
                    error = %e,
                    "{} failed, transaction left active",
                    finish.label()
                );
                guard.transaction = TransactionState::Active(handle);
            }

            Err(DriverError::transaction(
                &format!("{} failed", finish.label()),
                e,
            ))
        })
    }
}
