//! `TursoDbal`: blocking DBAL-style driver adapter for `LibSQL`/Turso databases
//!
//! This is the root module. It declares the submodules and re-exports the
//! types a caller needs: resolve a [`ConnectionConfig`] into a [`Connection`]
//! with [`connect`], then `query`/`exec` directly or `prepare` a
//! [`Statement`], bind parameters, execute it and fetch from the
//! [`QueryResult`].
//!
//! ```no_run
//! use turso_dbal::{connect, ConnectionConfig};
//!
//! # fn main() -> turso_dbal::Result<()> {
//! let conn = connect(&ConnectionConfig::memory())?;
//! conn.exec("CREATE TABLE users (id INTEGER, name TEXT)")?;
//!
//! let mut stmt = conn.prepare("INSERT INTO users VALUES (?, :name)")?;
//! stmt.bind(1, 1_i64);
//! stmt.bind(":name", "Alice");
//! stmt.execute()?;
//!
//! let mut result = conn.query("SELECT id, name FROM users")?;
//! let names = result.fetch_all_key_value()?;
//! assert_eq!(names.len(), 1);
//! # Ok(())
//! # }
//! ```
pub mod config;
pub mod connection;
pub mod constants;
pub mod decode;
pub mod driver;
pub mod error;
pub mod metadata;
pub mod models;
pub mod query;
pub mod replication;
pub mod result;
pub mod savepoint;
pub mod statement;
pub mod transaction;
pub mod utils;

pub use config::{ConnectionConfig, DriverOptions};
pub use connection::Connection;
pub use driver::{connect, open_handle, resolve};
pub use error::{DriverError, ErrorKind, Result};
pub use libsql::Value;
pub use models::{ConnectionMode, ExecutionContext, NormalizedParams, TransactionBehavior};
pub use result::{AssociativeRow, QueryResult};
pub use statement::{BoundParameters, ParamKey, Statement};
pub use utils::escape_string;

#[cfg(test)]
mod tests;
