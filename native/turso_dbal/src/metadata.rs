/// Connection metadata and counters
///
/// Row-change counters and autocommit state, read from the client that
/// statements currently run on (the active transaction's, if any).
use crate::connection::Connection;
use crate::error::Result;
use crate::utils::safe_lock_arc;

impl Connection {
    /// Number of rows changed by the most recent statement.
    ///
    /// This is the client's "changes" counter passed through unmodified, not
    /// an auto-increment id. Use [`Connection::last_insert_rowid`] for the id.
    pub fn last_insert_id(&self) -> Result<u64> {
        self.changes()
    }

    /// Rows modified by the most recent INSERT, UPDATE or DELETE.
    pub fn changes(&self) -> Result<u64> {
        let guard = safe_lock_arc(&self.ctx.session, "changes session")?;
        Ok(guard.executor().changes())
    }

    /// Rows modified since the connection was opened.
    pub fn total_changes(&self) -> Result<u64> {
        let guard = safe_lock_arc(&self.ctx.session, "total_changes session")?;
        Ok(guard.executor().total_changes())
    }

    /// Rowid of the most recently inserted row, 0 if nothing was inserted.
    pub fn last_insert_rowid(&self) -> Result<i64> {
        let guard = safe_lock_arc(&self.ctx.session, "last_insert_rowid session")?;
        Ok(guard.executor().last_insert_rowid())
    }

    /// `true` outside a transaction at the SQL level, as the engine sees it.
    pub fn is_autocommit(&self) -> Result<bool> {
        let guard = safe_lock_arc(&self.ctx.session, "is_autocommit session")?;
        Ok(guard.executor().is_autocommit())
    }
}
