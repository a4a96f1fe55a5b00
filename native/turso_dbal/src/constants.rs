/// Global constants and shared runtime for TursoDbal
///
/// This module holds the static configuration defaults and the process-wide
/// Tokio runtime that drives the async LibSQL client behind the blocking API.
use once_cell::sync::Lazy;
use tokio::runtime::Runtime;

/// Global Tokio runtime for async operations
///
/// Every blocking adapter call is driven to completion with `block_on` on this
/// runtime. It is multi-threaded so the background sync task of a remote
/// replica keeps running between calls.
///
/// IMPORTANT: This panics if Tokio runtime creation fails, which can only happen in
/// extremely rare circumstances (e.g., system has no available threads).
pub static TOKIO_RUNTIME: Lazy<Runtime> = Lazy::new(|| {
    Runtime::new()
        .expect("Failed to initialize Tokio runtime - check system resources and thread limits")
});

/// Timeout for opening a handle and for manual sync operations (in seconds)
pub const DEFAULT_SYNC_TIMEOUT_SECS: u64 = 30;

/// Default replica sync interval (in seconds)
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 5;

/// Remote replicas read their own writes unless told otherwise
pub const DEFAULT_READ_YOUR_WRITES: bool = true;

/// Empty key means "no encryption at rest"
pub const DEFAULT_ENCRYPTION_KEY: &str = "";

/// Substrings that mark a url as a local database file
pub const DATABASE_FILE_EXTENSIONS: [&str; 2] = [".db", ".sqlite"];

/// DSN prefix emitted by frameworks for SQLite paths, stripped before use
pub const SQLITE_URL_PREFIX: &str = "sqlite:///";

/// Address of the transient in-process store
pub const MEMORY_DATABASE: &str = ":memory:";
