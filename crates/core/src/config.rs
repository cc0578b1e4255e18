//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use time::Duration;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Allow cross-origin requests from the dashboard (default: true).
    #[serde(default = "default_cors_enabled")]
    pub cors_enabled: bool,
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_cors_enabled() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cors_enabled: default_cors_enabled(),
        }
    }
}

/// Session issuance configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Lifetime of access sessions in seconds.
    #[serde(default = "default_access_ttl_secs")]
    pub access_ttl_secs: u64,
    /// Lifetime of refresh sessions in seconds.
    #[serde(default = "default_refresh_ttl_secs")]
    pub refresh_ttl_secs: u64,
}

fn default_access_ttl_secs() -> u64 {
    7 * 24 * 3600 // 7 days
}

fn default_refresh_ttl_secs() -> u64 {
    30 * 24 * 3600 // 30 days
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_ttl_secs: default_access_ttl_secs(),
            refresh_ttl_secs: default_refresh_ttl_secs(),
        }
    }
}

impl AuthConfig {
    /// Access session lifetime as a Duration.
    pub fn access_ttl(&self) -> Duration {
        // Saturate at i64::MAX to prevent overflow wrapping to negative
        Duration::seconds(i64::try_from(self.access_ttl_secs).unwrap_or(i64::MAX))
    }

    /// Refresh session lifetime as a Duration.
    pub fn refresh_ttl(&self) -> Duration {
        Duration::seconds(i64::try_from(self.refresh_ttl_secs).unwrap_or(i64::MAX))
    }
}

/// Inventory store backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    /// SQLite database file.
    Sqlite {
        /// Path to the database file (created if missing).
        path: PathBuf,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("./data/stockroom.db"),
        }
    }
}

/// Top-level application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Create a test configuration with short-lived defaults.
    ///
    /// **For testing only.** Tests supply their own temporary store path.
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig {
                bind: "127.0.0.1:0".to_string(),
                cors_enabled: false,
            },
            store: StoreConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}
