// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Redis-backed lock store
//!
//! Each transaction is a Lua script, so Redis runs it atomically. A lock
//! record is a hash with `UUID` and `COUNT` fields and a millisecond TTL.

use crate::config::ServiceConfig;
use async_trait::async_trait;
use fred::prelude::{ClientLike, Config, LuaInterface, Pool};
use fred::types::Builder;
use lockstep_core::{AcquireReply, LockStore, ReleaseReply, StoreError};
use std::time::Duration;

/// KEYS[1] lock key, ARGV[1] uuid, ARGV[2] ttl in ms.
/// Returns the new count, or 0 when another uuid holds the key.
pub(crate) const ACQUIRE_SCRIPT: &str = r#"
if (redis.call('EXISTS', KEYS[1]) == 0)
then
  redis.call('HSET', KEYS[1], 'UUID', ARGV[1])
  redis.call('PEXPIRE', KEYS[1], ARGV[2])
  return redis.call('HINCRBY', KEYS[1], 'COUNT', 1)
end

if (redis.call('HGET', KEYS[1], 'UUID') == ARGV[1])
then
  redis.call('PEXPIRE', KEYS[1], ARGV[2])
  return redis.call('HINCRBY', KEYS[1], 'COUNT', 1)
end

return 0
"#;

/// KEYS[1] lock key, ARGV[1] uuid.
/// Returns 0 absent, 1 uuid mismatch, 2 delete failed, 666 released.
pub(crate) const RELEASE_SCRIPT: &str = r#"
if (redis.call('EXISTS', KEYS[1]) == 0)
then
  return 0
end

if (redis.call('HGET', KEYS[1], 'UUID') ~= ARGV[1])
then
  return 1
end

if (tonumber(redis.call('HGET', KEYS[1], 'COUNT')) > 1)
then
  redis.call('HINCRBY', KEYS[1], 'COUNT', -1)
  return 666
end

if (redis.call('DEL', KEYS[1]) == 0)
then
  return 2
end

redis.call('PUBLISH', KEYS[1], 1)
return 666
"#;

/// KEYS[1] lock key, ARGV[1] ttl in ms. Returns 1 if refreshed, 0 if absent.
pub(crate) const RENEW_SCRIPT: &str = r#"
if (redis.call('EXISTS', KEYS[1]) == 0)
then
  return 0
end

return redis.call('PEXPIRE', KEYS[1], ARGV[1])
"#;

/// Lock store over a pooled Redis connection
#[derive(Clone)]
pub struct RedisLockStore {
    pool: Pool,
}

impl RedisLockStore {
    /// Wrap an already connected pool
    pub fn from_pool(pool: Pool) -> Self {
        Self { pool }
    }

    /// Build a pool from `service` and wait for it to connect
    pub async fn connect(service: &ServiceConfig) -> Result<Self, StoreError> {
        let config = Config::from_url(&service.dsn).map_err(connection_error)?;
        let connect_timeout = service.connect_timeout;
        let command_timeout = service.timeout;

        let pool = Builder::from_config(config)
            .with_connection_config(|config| {
                config.connection_timeout = connect_timeout;
            })
            .with_performance_config(|config| {
                config.default_command_timeout = command_timeout;
            })
            .build_pool(service.pool_size)
            .map_err(connection_error)?;

        // Connection tasks run until the pool quits
        let _handles = pool.connect_pool();
        tracing::debug!(service = %service.name, pool_size = service.pool_size, "waiting for redis");
        pool.wait_for_connect().await.map_err(connection_error)?;
        tracing::info!(service = %service.name, "redis connected");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    async fn eval(&self, script: &'static str, key: &str, args: Vec<String>) -> Result<i64, StoreError> {
        self.pool
            .eval::<i64, _, _, _>(script, vec![key.to_string()], args)
            .await
            .map_err(|e| StoreError::Command(e.to_string()))
    }
}

fn connection_error(e: impl std::fmt::Display) -> StoreError {
    StoreError::Connection(e.to_string())
}

fn ttl_millis(ttl: Duration) -> String {
    ttl.as_millis().to_string()
}

#[async_trait]
impl LockStore for RedisLockStore {
    async fn acquire(
        &self,
        key: &str,
        uuid: &str,
        ttl: Duration,
    ) -> Result<AcquireReply, StoreError> {
        let code = self
            .eval(ACQUIRE_SCRIPT, key, vec![uuid.to_string(), ttl_millis(ttl)])
            .await?;
        AcquireReply::from_code(code)
    }

    async fn release(&self, key: &str, uuid: &str) -> Result<ReleaseReply, StoreError> {
        let code = self.eval(RELEASE_SCRIPT, key, vec![uuid.to_string()]).await?;
        ReleaseReply::from_code(code)
    }

    async fn renew(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        let code = self.eval(RENEW_SCRIPT, key, vec![ttl_millis(ttl)]).await?;
        Ok(code == 1)
    }
}

#[cfg(test)]
#[path = "redis_tests.rs"]
mod tests;
