/// Connection mode resolution and handle establishment
///
/// Turns a caller's `ConnectionConfig` into one of four connection modes and
/// opens the matching LibSQL handle:
/// - **remote_replica**: local replica file kept in sync with a remote primary
/// - **remote**: direct connection to a remote LibSQL/Turso server
/// - **local**: local SQLite file
/// - **memory**: transient in-process database
use crate::config::{ConnectionConfig, DriverOptions};
use crate::connection::Connection;
use crate::constants::*;
use crate::error::{DriverError, Result};
use crate::models::{ConnectionMode, Handle, NormalizedParams};
use bytes::Bytes;
use libsql::{Builder, Cipher, EncryptionConfig, OpenFlags};
use std::time::Duration;
use tracing::debug;

/// Resolve the connection mode for a configuration.
///
/// Pure and total: anything that matches no other mode falls back to
/// [`ConnectionMode::Memory`]. Precedence, first match wins:
/// 1. file-like url + auth token + sync url → `RemoteReplica`
/// 2. auth token + sync url → `Remote`
/// 3. file-like url → `Local`
/// 4. otherwise → `Memory`
pub fn resolve(config: &ConnectionConfig) -> (ConnectionMode, NormalizedParams) {
    let params = normalize(config);
    let mode = connection_mode(&params);
    debug!(mode = %mode, framework = params.framework, "resolved connection mode");
    (mode, params)
}

fn normalize(config: &ConnectionConfig) -> NormalizedParams {
    let mut url = config.url.as_deref().or(config.path.as_deref()).map(strip_prefix);
    let mut auth_token = config.auth_token.clone();
    let mut sync_url = config.sync_url.clone();

    let DriverOptions {
        use_framework,
        url: fw_url,
        auth_token: fw_token,
        sync_url: fw_sync_url,
    } = &config.driver_options;

    if *use_framework {
        match (fw_url, fw_token, fw_sync_url) {
            (Some(fw_url), Some(token), Some(sync)) => {
                url = Some(strip_prefix(fw_url));
                auth_token = Some(token.clone());
                sync_url = Some(sync.clone());
            }
            (None, Some(token), Some(sync)) => {
                url = None;
                auth_token = Some(token.clone());
                sync_url = Some(sync.clone());
            }
            _ => {
                if let Some(path) = &config.path {
                    url = Some(strip_prefix(path));
                } else if config.memory {
                    url = Some(MEMORY_DATABASE.to_string());
                }
            }
        }
    }

    NormalizedParams {
        url,
        auth_token,
        sync_url,
        sync_interval: Duration::from_secs(
            config.sync_interval.unwrap_or(DEFAULT_SYNC_INTERVAL_SECS),
        ),
        read_your_writes: config.read_your_writes.unwrap_or(DEFAULT_READ_YOUR_WRITES),
        encryption_key: config
            .encryption_key
            .clone()
            .unwrap_or_else(|| DEFAULT_ENCRYPTION_KEY.to_string()),
        framework: *use_framework,
    }
}

fn connection_mode(params: &NormalizedParams) -> ConnectionMode {
    let file_like = params.url.as_deref().is_some_and(is_file_like);
    let remote = non_empty(&params.auth_token) && non_empty(&params.sync_url);

    match (file_like, remote) {
        (true, true) => ConnectionMode::RemoteReplica,
        (false, true) => ConnectionMode::Remote,
        (true, false) => ConnectionMode::Local,
        (false, false) => ConnectionMode::Memory,
    }
}

/// Whether a url names a database file
pub fn is_file_like(url: &str) -> bool {
    DATABASE_FILE_EXTENSIONS.iter().any(|ext| url.contains(ext))
}

fn strip_prefix(url: &str) -> String {
    url.replace(SQLITE_URL_PREFIX, "")
}

fn non_empty(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

fn encryption_config(key: &str) -> Option<EncryptionConfig> {
    if key.is_empty() {
        return None;
    }
    Some(EncryptionConfig {
        cipher: Cipher::Aes256Cbc,
        encryption_key: Bytes::from(key.to_string()),
    })
}

fn required<'a>(value: &'a Option<String>, name: &str, mode: ConnectionMode) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DriverError::Configuration(format!("{mode} mode requires `{name}`")))
}

/// Open the LibSQL handle for a resolved mode.
///
/// Client failures become `ConnectionError` with the original message; nothing
/// is retried. Opening is bounded by a 30-second timeout, and remote handles
/// are pinged with `SELECT 1` before being returned.
pub fn open_handle(mode: ConnectionMode, params: &NormalizedParams) -> Result<Handle> {
    TOKIO_RUNTIME.block_on(async {
        let timeout = Duration::from_secs(DEFAULT_SYNC_TIMEOUT_SECS);

        tokio::time::timeout(timeout, open_handle_async(mode, params))
            .await
            .map_err(|_| {
                DriverError::Connection(format!(
                    "Connection timeout after {DEFAULT_SYNC_TIMEOUT_SECS} seconds"
                ))
            })?
    })
}

async fn open_handle_async(mode: ConnectionMode, params: &NormalizedParams) -> Result<Handle> {
    let db = match mode {
        ConnectionMode::RemoteReplica => {
            let path = required(&params.url, "url", mode)?;
            let sync_url = required(&params.sync_url, "sync_url", mode)?;
            let token = required(&params.auth_token, "auth_token", mode)?;

            let mut builder =
                Builder::new_remote_replica(path, sync_url.to_string(), token.to_string())
                    .sync_interval(params.sync_interval)
                    .read_your_writes(params.read_your_writes);

            if let Some(config) = encryption_config(&params.encryption_key) {
                builder = builder.encryption_config(config);
            }

            builder.build().await
        }
        ConnectionMode::Remote => {
            let sync_url = required(&params.sync_url, "sync_url", mode)?;
            let token = required(&params.auth_token, "auth_token", mode)?;

            Builder::new_remote(sync_url.to_string(), token.to_string())
                .build()
                .await
        }
        ConnectionMode::Local => {
            let path = required(&params.url, "url", mode)?;

            let mut builder = Builder::new_local(path)
                .flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE);

            if let Some(config) = encryption_config(&params.encryption_key) {
                builder = builder.encryption_config(config);
            }

            builder.build().await
        }
        ConnectionMode::Memory => Builder::new_local(MEMORY_DATABASE).build().await,
    }
    .map_err(|e| DriverError::connection("Failed to build DB", e))?;

    let client = db
        .connect()
        .map_err(|e| DriverError::connection("Failed to connect", e))?;

    if mode.is_networked() {
        client
            .query("SELECT 1", ())
            .await
            .map_err(|e| DriverError::connection("Failed ping", e))?;
    }

    debug!(mode = %mode, "opened handle");
    Ok(Handle { db, client })
}

/// Resolve, open and wrap a configuration into a ready `Connection`.
pub fn connect(config: &ConnectionConfig) -> Result<Connection> {
    let (mode, params) = resolve(config);
    let handle = open_handle(mode, &params)?;
    Ok(Connection::new(handle, mode))
}
