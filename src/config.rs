//! Application-level configuration loading: storage backend, SSE capacity and lifecycle gate.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "DOMATCH_BACK_CONFIG_PATH";
const DEFAULT_SSE_CAPACITY: usize = 64;
const DEFAULT_GATE_TIMEOUT_MS: u64 = 5_000;

/// Which persistence backend the server installs at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// In-process tables, lost on restart.
    Memory,
    /// MongoDB through `MONGO_URI` / `MONGO_DB`.
    Mongo,
}

impl Default for StorageBackend {
    fn default() -> Self {
        if cfg!(feature = "mongo-store") {
            StorageBackend::Mongo
        } else {
            StorageBackend::Memory
        }
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    storage: StorageBackend,
    sse_capacity: usize,
    gate_timeout: Option<Duration>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        storage = ?app_config.storage,
                        sse_capacity = app_config.sse_capacity,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document; absent keys keep their defaults.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Configuration with the in-memory store, handy for tests and local runs.
    pub fn in_memory() -> Self {
        Self {
            storage: StorageBackend::Memory,
            ..Self::default()
        }
    }

    /// Override the lifecycle gate timeout; `None` waits forever.
    pub fn with_gate_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.gate_timeout = timeout;
        self
    }

    /// Selected storage backend.
    pub fn storage(&self) -> StorageBackend {
        self.storage
    }

    /// Buffer size of the public SSE broadcast channel.
    pub fn sse_capacity(&self) -> usize {
        self.sse_capacity
    }

    /// Maximum time a lifecycle operation may hold or wait for the gate.
    pub fn gate_timeout(&self) -> Option<Duration> {
        self.gate_timeout
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageBackend::default(),
            sse_capacity: DEFAULT_SSE_CAPACITY,
            gate_timeout: Some(Duration::from_millis(DEFAULT_GATE_TIMEOUT_MS)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    storage: Option<StorageBackend>,
    sse_capacity: Option<usize>,
    /// Milliseconds; `0` disables the timeout.
    gate_timeout_ms: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        let gate_timeout = match value.gate_timeout_ms {
            Some(0) => None,
            Some(ms) => Some(Duration::from_millis(ms)),
            None => defaults.gate_timeout,
        };
        Self {
            storage: value.storage.unwrap_or(defaults.storage),
            sse_capacity: value
                .sse_capacity
                .filter(|capacity| *capacity > 0)
                .unwrap_or(defaults.sse_capacity),
            gate_timeout,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_keep_defaults() {
        let config = AppConfig::from_json(r#"{"storage": "memory"}"#).unwrap();
        assert_eq!(config.storage(), StorageBackend::Memory);
        assert_eq!(config.sse_capacity(), DEFAULT_SSE_CAPACITY);
        assert_eq!(
            config.gate_timeout(),
            Some(Duration::from_millis(DEFAULT_GATE_TIMEOUT_MS))
        );
    }

    #[test]
    fn zero_timeout_disables_gate_deadline() {
        let config =
            AppConfig::from_json(r#"{"gate_timeout_ms": 0, "sse_capacity": 0}"#).unwrap();
        assert_eq!(config.gate_timeout(), None);
        assert_eq!(config.sse_capacity(), DEFAULT_SSE_CAPACITY);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(AppConfig::from_json(r#"{"storage": "postgres"}"#).is_err());
    }
}
