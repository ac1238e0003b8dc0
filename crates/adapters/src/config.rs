// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration for named lock stores
//!
//! ```toml
//! [client.redis]
//! pool_size = 8
//! timeout = "1s"
//! connect_timeout = "1s"
//!
//! [[client.service]]
//! name = "orders"
//! dsn = "redis://127.0.0.1:6379/0"
//! timeout = "500ms"
//! ```
//!
//! Fields left unset on a service inherit the `[client.redis]` values.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_POOL_SIZE: usize = 8;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Errors from loading or querying client configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("service {0} is defined more than once")]
    DuplicateService(String),
    #[error("service {0}: pool_size must be at least 1")]
    InvalidPoolSize(String),
    #[error("unknown service: {0}")]
    UnknownService(String),
}

/// Parsed client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub client: ClientSection,
}

/// The `[client]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSection {
    /// Defaults shared by every service
    #[serde(default)]
    pub redis: StoreDefaults,
    #[serde(default, rename = "service")]
    pub services: Vec<ServiceEntry>,
}

/// Shared connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreDefaults {
    pub pool_size: usize,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
}

impl Default for StoreDefaults {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// One `[[client.service]]` entry as written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub name: String,
    pub dsn: String,
    #[serde(default)]
    pub pool_size: Option<usize>,
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
    #[serde(default, with = "humantime_serde")]
    pub connect_timeout: Option<Duration>,
}

/// Fully resolved settings for one named service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub name: String,
    pub dsn: String,
    pub pool_size: usize,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl ClientConfig {
    /// Read and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            services = config.client.services.len(),
            "loaded client config"
        );
        Ok(config)
    }

    /// Parse and validate config from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Names of all configured services, in file order
    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.client.services.iter().map(|s| s.name.as_str())
    }

    /// Resolve the settings for `name`, filling unset fields from the defaults
    pub fn service(&self, name: &str) -> Result<ServiceConfig, ConfigError> {
        let entry = self
            .client
            .services
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ConfigError::UnknownService(name.to_string()))?;
        let defaults = &self.client.redis;

        Ok(ServiceConfig {
            name: entry.name.clone(),
            dsn: entry.dsn.clone(),
            pool_size: entry.pool_size.unwrap_or(defaults.pool_size),
            timeout: entry.timeout.unwrap_or(defaults.timeout),
            connect_timeout: entry.connect_timeout.unwrap_or(defaults.connect_timeout),
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = std::collections::HashSet::new();
        for entry in &self.client.services {
            if !seen.insert(entry.name.as_str()) {
                return Err(ConfigError::DuplicateService(entry.name.clone()));
            }
            if entry.pool_size.unwrap_or(self.client.redis.pool_size) == 0 {
                return Err(ConfigError::InvalidPoolSize(entry.name.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
