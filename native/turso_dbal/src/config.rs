/// Connection configuration bag
///
/// Mirrors the option names a DBAL-style caller passes in. Every field is
/// optional; `driver::resolve` decides which combination is meaningful.
/// Both snake_case and camelCase spellings are accepted when deserializing.
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Options a framework integration nests under `driverOptions`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverOptions {
    #[serde(alias = "useFramework")]
    pub use_framework: bool,
    pub url: Option<String>,
    #[serde(alias = "authToken")]
    pub auth_token: Option<String>,
    #[serde(alias = "syncUrl")]
    pub sync_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Local database file (or remote URL fragment) as given by the caller
    pub url: Option<String>,
    #[serde(alias = "authToken")]
    pub auth_token: Option<String>,
    #[serde(alias = "syncUrl")]
    pub sync_url: Option<String>,
    /// Replica sync interval in seconds
    #[serde(alias = "syncInterval")]
    pub sync_interval: Option<u64>,
    #[serde(alias = "readYourWrites")]
    pub read_your_writes: Option<bool>,
    #[serde(alias = "encryptionKey")]
    pub encryption_key: Option<String>,
    pub path: Option<String>,
    pub memory: bool,
    #[serde(rename = "driverOptions", alias = "driver_options")]
    pub driver_options: DriverOptions,
}

impl ConnectionConfig {
    /// Parse a JSON options bag.
    ///
    /// Malformed input is reported as a configuration error.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn memory() -> Self {
        Self {
            memory: true,
            ..Self::default()
        }
    }

    pub fn local(path: impl Into<String>) -> Self {
        Self {
            url: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn remote(sync_url: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            sync_url: Some(sync_url.into()),
            auth_token: Some(auth_token.into()),
            ..Self::default()
        }
    }

    pub fn remote_replica(
        path: impl Into<String>,
        sync_url: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Self {
        Self {
            url: Some(path.into()),
            ..Self::remote(sync_url, auth_token)
        }
    }

    #[must_use]
    pub fn with_encryption_key(mut self, key: impl Into<String>) -> Self {
        self.encryption_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_sync_interval(mut self, secs: u64) -> Self {
        self.sync_interval = Some(secs);
        self
    }

    #[must_use]
    pub fn with_read_your_writes(mut self, enabled: bool) -> Self {
        self.read_your_writes = Some(enabled);
        self
    }

    #[must_use]
    pub fn with_driver_options(mut self, options: DriverOptions) -> Self {
        self.driver_options = options;
        self
    }
}
