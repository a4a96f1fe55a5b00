/// Replica synchronization
///
/// Remote replicas already sync on their configured interval and push writes
/// to the primary automatically. These calls give explicit control on top.
///
/// **Note on Locking**: `libsql::Database` is not cloneable, so the session
/// lock is held for the whole sync. This is safe under `block_on`.
use crate::connection::Connection;
use crate::constants::{DEFAULT_SYNC_TIMEOUT_SECS, TOKIO_RUNTIME};
use crate::error::{DriverError, Result};
use crate::models::ConnectionMode;
use crate::utils::{safe_lock_arc, sync_with_timeout};
use tracing::debug;

impl Connection {
    /// Pull the latest frames from the primary.
    ///
    /// No-op for local, memory and direct remote connections.
    /// **Timeout**: 30 seconds.
    pub fn sync(&self) -> Result<()> {
        if self.ctx.mode != ConnectionMode::RemoteReplica {
            return Ok(());
        }

        #[allow(clippy::await_holding_lock)]
        TOKIO_RUNTIME.block_on(async {
            let guard = safe_lock_arc(&self.ctx.session, "sync session")?;
            sync_with_timeout(&guard.handle.db, DEFAULT_SYNC_TIMEOUT_SECS).await
        })?;

        debug!(conn_id = %self.ctx.conn_id, "replica synced");
        Ok(())
    }

    /// Current replication frame number, 0 when not a replica.
    pub fn replication_index(&self) -> Result<u64> {
        if self.ctx.mode != ConnectionMode::RemoteReplica {
            return Ok(0);
        }

        #[allow(clippy::await_holding_lock)]
        TOKIO_RUNTIME.block_on(async {
            let guard = safe_lock_arc(&self.ctx.session, "replication_index session")?;
            let frame_no = guard
                .handle
                .db
                .replication_index()
                .await
                .map_err(|e| DriverError::connection("replication_index failed", e))?;
            Ok(frame_no.unwrap_or(0))
        })
    }
}
