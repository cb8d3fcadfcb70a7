//! Configuration for repsheet

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::positions::PositionPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub positions: PositionConfig,
}

impl Config {
    /// Load from `REPSHEET_*` environment variables, e.g.
    /// `REPSHEET_DATABASE__TYPE=postgres`.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::with_prefix("REPSHEET")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// SQLite in-memory database with default settings
    pub fn in_memory() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::in_memory(),
            positions: PositionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DatabaseConfig {
    Postgres {
        url: String,
        #[serde(default = "default_max_conn")]
        max_connections: u32,
        #[serde(default = "default_acquire_timeout")]
        acquire_timeout_secs: u64,
        /// Upper bound on waiting for a row or owner lock; 0 waits forever
        #[serde(default = "default_lock_timeout")]
        lock_timeout_ms: u64,
    },
    Sqlite {
        path: String,
    },
}

impl DatabaseConfig {
    pub fn postgres(url: impl Into<String>) -> Self {
        Self::Postgres {
            url: url.into(),
            max_connections: default_max_conn(),
            acquire_timeout_secs: default_acquire_timeout(),
            lock_timeout_ms: default_lock_timeout(),
        }
    }
    pub fn sqlite(path: impl Into<String>) -> Self {
        Self::Sqlite { path: path.into() }
    }
    pub fn in_memory() -> Self {
        Self::Sqlite {
            path: ":memory:".to_string(),
        }
    }

    /// Connection URL for the SQLite variant
    pub fn sqlite_url(path: &str) -> String {
        if path == ":memory:" {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite://{}?mode=rwc", path)
        }
    }
}

fn default_max_conn() -> u32 {
    10
}
fn default_acquire_timeout() -> u64 {
    30
}
fn default_lock_timeout() -> u64 {
    10_000
}

/// How the position manager treats positions and transient store failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionConfig {
    /// Out-of-range handling, applied identically to insert and shift
    #[serde(default)]
    pub policy: PositionPolicy,
    /// Extra attempts after a store conflict or timeout
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            policy: PositionPolicy::default(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff(),
        }
    }
}

impl PositionConfig {
    /// Delay before retry number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(u64::from(attempt)))
    }
}

fn default_max_retries() -> u32 {
    3
}
fn default_retry_backoff() -> u64 {
    50
}
