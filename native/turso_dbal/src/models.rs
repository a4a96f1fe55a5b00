/// Data structures shared across the adapter
///
/// This module defines the connection mode, the normalized connection
/// parameters, the owned client handle and the per-connection session state
/// (handle plus transaction state).
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub use libsql::TransactionBehavior;

/// Connection mode enumeration
///
/// Determines how the handle is opened and what capabilities are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionMode {
    /// Local replica file kept in sync with a remote primary
    RemoteReplica,
    /// Direct connection to a remote LibSQL/Turso server
    Remote,
    /// Local SQLite database file
    Local,
    /// Transient in-process database
    Memory,
}

impl ConnectionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionMode::RemoteReplica => "remote_replica",
            ConnectionMode::Remote => "remote",
            ConnectionMode::Local => "local",
            ConnectionMode::Memory => "memory",
        }
    }

    /// Whether the handle talks to a remote server at open time
    pub fn is_networked(self) -> bool {
        matches!(self, ConnectionMode::RemoteReplica | ConnectionMode::Remote)
    }
}

impl std::fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters left after resolving a `ConnectionConfig`
///
/// Defaults are already applied; `url` has any framework DSN prefix removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedParams {
    pub url: Option<String>,
    pub auth_token: Option<String>,
    pub sync_url: Option<String>,
    pub sync_interval: Duration,
    pub read_your_writes: bool,
    pub encryption_key: String,
    /// Set when the options came through a framework's `driverOptions`
    pub framework: bool,
}

/// The opened LibSQL client.
///
/// Owned by exactly one `Connection`; dropping it closes the database.
pub struct Handle {
    /// The LibSQL database instance
    pub db: libsql::Database,
    /// An active connection to the database
    pub client: libsql::Connection,
}

impl std::fmt::Debug for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle").finish_non_exhaustive()
    }
}

/// An open transaction on the session's client
///
/// `conn` is the transaction's own connection, the one statements must run on
/// while it is active. `txn` is `None` once the client consumed the
/// transaction in a failed commit or rollback that left it open on the
/// engine side.
pub struct TxnHandle {
    pub txn: Option<libsql::Transaction>,
    pub conn: libsql::Connection,
}

impl TxnHandle {
    pub fn new(txn: libsql::Transaction) -> Self {
        let conn = (*txn).clone();
        TxnHandle {
            txn: Some(txn),
            conn,
        }
    }
}

impl std::fmt::Debug for TxnHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxnHandle")
            .field("detached", &self.txn.is_none())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub enum TransactionState {
    #[default]
    Idle,
    Active(TxnHandle),
}

/// Handle plus transaction state, shared by a Connection and its Statements
#[derive(Debug)]
pub struct Session {
    pub handle: Handle,
    pub transaction: TransactionState,
}

impl Session {
    pub fn new(handle: Handle) -> Self {
        Session {
            handle,
            transaction: TransactionState::Idle,
        }
    }

    /// The client every statement must run on: the transaction's while one is
    /// active, the bare handle otherwise.
    pub fn executor(&self) -> &libsql::Connection {
        match &self.transaction {
            TransactionState::Active(txn) => &txn.conn,
            TransactionState::Idle => &self.handle.client,
        }
    }

    pub fn in_transaction(&self) -> bool {
        matches!(self.transaction, TransactionState::Active(_))
    }
}

/// What a Statement needs to know about the Connection that prepared it
///
/// Cloned into every Statement so execution follows the connection's current
/// transaction state rather than the state at prepare time.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub mode: ConnectionMode,
    pub conn_id: String,
    pub session: Arc<Mutex<Session>>,
}
