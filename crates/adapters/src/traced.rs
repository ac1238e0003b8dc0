// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced store wrapper for consistent observability

use async_trait::async_trait;
use lockstep_core::{AcquireReply, LockStore, ReleaseReply, StoreError};
use std::time::Duration;
use tracing::Instrument;

/// Wrapper that adds tracing to any LockStore
#[derive(Clone)]
pub struct TracedLockStore<S> {
    inner: S,
}

impl<S> TracedLockStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: LockStore> LockStore for TracedLockStore<S> {
    async fn acquire(
        &self,
        key: &str,
        uuid: &str,
        ttl: Duration,
    ) -> Result<AcquireReply, StoreError> {
        let span = tracing::info_span!("store.acquire", key, uuid);

        async {
            tracing::debug!(ttl = %humantime::format_duration(ttl), "acquiring");

            let start = std::time::Instant::now();
            let result = self.inner.acquire(key, uuid, ttl).await;
            let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            match &result {
                Ok(AcquireReply::Acquired { count }) => {
                    tracing::info!(count, elapsed_ms, "acquired")
                }
                Ok(AcquireReply::Held) => tracing::debug!(elapsed_ms, "held by another owner"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "acquire failed"),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn release(&self, key: &str, uuid: &str) -> Result<ReleaseReply, StoreError> {
        let span = tracing::info_span!("store.release", key, uuid);

        async {
            let start = std::time::Instant::now();
            let result = self.inner.release(key, uuid).await;
            let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            match &result {
                Ok(ReleaseReply::Released) => tracing::info!(elapsed_ms, "released"),
                Ok(reply) => tracing::warn!(elapsed_ms, code = reply.code(), "release refused"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "release failed"),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn renew(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        let result = self.inner.renew(key, ttl).await;
        tracing::trace!(key, renewed = ?result.as_ref().ok(), "renew");
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
