// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named store registry
//!
//! A [`StoreRegistry`] owns a [`ClientConfig`] and hands out one connected
//! store per service name, connecting on first use.

use crate::config::{ClientConfig, ConfigError, ServiceConfig};
use async_trait::async_trait;
use lockstep_core::{LockStore, StoreError};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors from resolving a named store
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("connecting to {service}: {source}")]
    Connect {
        service: String,
        source: StoreError,
    },
}

/// Builds a store from resolved service settings
#[async_trait]
pub trait StoreConnector: Send + Sync + 'static {
    type Store: LockStore;

    async fn connect(&self, service: &ServiceConfig) -> Result<Self::Store, StoreError>;
}

/// Connects [`RedisLockStore`](crate::RedisLockStore)s
#[cfg(feature = "redis")]
#[derive(Clone, Copy, Debug, Default)]
pub struct RedisConnector;

#[cfg(feature = "redis")]
#[async_trait]
impl StoreConnector for RedisConnector {
    type Store = crate::store::RedisLockStore;

    async fn connect(&self, service: &ServiceConfig) -> Result<Self::Store, StoreError> {
        crate::store::RedisLockStore::connect(service).await
    }
}

/// Lazily connected stores keyed by service name
pub struct StoreRegistry<C: StoreConnector> {
    config: ClientConfig,
    connector: C,
    stores: Mutex<HashMap<String, C::Store>>,
}

#[cfg(feature = "redis")]
impl StoreRegistry<RedisConnector> {
    pub fn redis(config: ClientConfig) -> Self {
        Self::new(config, RedisConnector)
    }
}

impl<C: StoreConnector> StoreRegistry<C> {
    pub fn new(config: ClientConfig, connector: C) -> Self {
        Self {
            config,
            connector,
            stores: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Store for `name`, connecting it if this is the first request
    ///
    /// Concurrent first requests for the same name connect once. A failed
    /// connection is not cached; the next request tries again.
    pub async fn store(&self, name: &str) -> Result<C::Store, RegistryError> {
        let service = self.config.service(name)?;

        let mut stores = self.stores.lock().await;
        if let Some(store) = stores.get(name) {
            return Ok(store.clone());
        }

        let start = std::time::Instant::now();
        let store = self
            .connector
            .connect(&service)
            .await
            .map_err(|source| RegistryError::Connect {
                service: name.to_string(),
                source,
            })?;
        tracing::debug!(
            service = name,
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "store connected"
        );

        stores.insert(name.to_string(), store.clone());
        Ok(store)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
