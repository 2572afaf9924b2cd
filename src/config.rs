//! Runtime configuration from environment variables.
//!
//! Endpoints and credentials are only ever read from the environment (or a
//! `.env` file loaded by the binary), never compiled in.

use crate::store::{FileStore, LedgerStore, MemoryStore, RemoteStore};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_ADDR: &str = "0.0.0.0:7447";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 10;

/// Errors in the environment configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Failed to build store: {0}")]
    Store(String),
}

/// Read an env var, treating blank values as unset
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// Which backend persists ledgers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    File,
    Remote,
}

impl std::str::FromStr for StoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreKind::Memory),
            "file" | "local" => Ok(StoreKind::File),
            "remote" => Ok(StoreKind::Remote),
            _ => Err(ConfigError::InvalidValue {
                name: "PIGSCORE_STORE",
                value: s.to_string(),
            }),
        }
    }
}

/// Configuration for the ledger store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub kind: StoreKind,
    /// Directory for the file store
    pub data_dir: PathBuf,
    /// Base URL of the remote key-value store
    pub remote_url: Option<String>,
    /// Auth token for the remote store
    pub remote_auth: Option<String>,
    pub remote_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::File,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            remote_url: None,
            remote_auth: None,
            remote_timeout: Duration::from_secs(DEFAULT_REMOTE_TIMEOUT_SECS),
        }
    }
}

impl StoreConfig {
    /// Load store configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let kind = match env_var("PIGSCORE_STORE") {
            Some(kind) => kind.parse()?,
            None => StoreKind::File,
        };

        let remote_timeout = match env_var("PIGSCORE_REMOTE_TIMEOUT") {
            Some(secs) => secs
                .parse()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidValue {
                    name: "PIGSCORE_REMOTE_TIMEOUT",
                    value: secs,
                })?,
            None => Duration::from_secs(DEFAULT_REMOTE_TIMEOUT_SECS),
        };

        Ok(Self {
            kind,
            data_dir: env_var("PIGSCORE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            remote_url: env_var("PIGSCORE_REMOTE_URL"),
            remote_auth: env_var("PIGSCORE_REMOTE_AUTH"),
            remote_timeout,
        })
    }

    /// Build the configured store
    pub fn build_store(&self) -> Result<Arc<dyn LedgerStore>, ConfigError> {
        match self.kind {
            StoreKind::Memory => {
                tracing::warn!("Using in-memory store, ledgers are lost on restart");
                Ok(Arc::new(MemoryStore::new()))
            }
            StoreKind::File => {
                tracing::info!("Using file store in {}", self.data_dir.display());
                Ok(Arc::new(FileStore::new(self.data_dir.clone())))
            }
            StoreKind::Remote => {
                let url = self
                    .remote_url
                    .clone()
                    .ok_or(ConfigError::Missing("PIGSCORE_REMOTE_URL"))?;
                if self.remote_auth.is_none() {
                    tracing::warn!("PIGSCORE_REMOTE_AUTH not set, remote requests are unauthenticated");
                }
                tracing::info!("Using remote store at {}", url);
                let store = RemoteStore::new(url, self.remote_auth.clone(), self.remote_timeout)
                    .map_err(|e| ConfigError::Store(e.to_string()))?;
                Ok(Arc::new(store))
            }
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub addr: SocketAddr,
    /// Optional front-end assets served for unknown paths
    pub static_dir: PathBuf,
    pub store: StoreConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr_value = env_var("PIGSCORE_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_value
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                name: "PIGSCORE_ADDR",
                value: addr_value.clone(),
            })?;

        Ok(Self {
            addr,
            static_dir: env_var("PIGSCORE_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
            store: StoreConfig::from_env()?,
        })
    }
}
