// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake lock store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use async_trait::async_trait;
use lockstep_core::{
    AcquireReply, FakeClock, LockRecord, LockStore, MemoryLockStore, ReleaseReply, StoreError,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Acquire {
        key: String,
        uuid: String,
        ttl: Duration,
    },
    Release {
        key: String,
        uuid: String,
    },
    Renew {
        key: String,
        ttl: Duration,
    },
}

/// In-memory lock store that records calls and can be told to fail
///
/// Leases follow a [`FakeClock`] the test advances by hand.
#[derive(Clone)]
pub struct FakeLockStore {
    inner: MemoryLockStore<FakeClock>,
    clock: FakeClock,
    calls: Arc<Mutex<Vec<StoreCall>>>,
    failure: Arc<Mutex<Option<StoreError>>>,
}

impl Default for FakeLockStore {
    fn default() -> Self {
        let clock = FakeClock::new();
        Self {
            inner: MemoryLockStore::with_clock(clock.clone()),
            clock,
            calls: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
        }
    }
}

impl FakeLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Renew calls recorded so far
    pub fn renewals(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, StoreCall::Renew { .. }))
            .count()
    }

    pub fn clock(&self) -> &FakeClock {
        &self.clock
    }

    pub fn record(&self, key: &str) -> Option<LockRecord> {
        self.inner.record(key)
    }

    /// Fail every following call with `err` until [`heal`](Self::heal)
    pub fn fail_with(&self, err: StoreError) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(err);
    }

    pub fn heal(&self) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    fn record_call(&self, call: StoreCall) -> Result<(), StoreError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
        match self.failure.lock().unwrap_or_else(|e| e.into_inner()).clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl LockStore for FakeLockStore {
    async fn acquire(
        &self,
        key: &str,
        uuid: &str,
        ttl: Duration,
    ) -> Result<AcquireReply, StoreError> {
        self.record_call(StoreCall::Acquire {
            key: key.to_string(),
            uuid: uuid.to_string(),
            ttl,
        })?;
        self.inner.acquire(key, uuid, ttl).await
    }

    async fn release(&self, key: &str, uuid: &str) -> Result<ReleaseReply, StoreError> {
        self.record_call(StoreCall::Release {
            key: key.to_string(),
            uuid: uuid.to_string(),
        })?;
        self.inner.release(key, uuid).await
    }

    async fn renew(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        self.record_call(StoreCall::Renew {
            key: key.to_string(),
            ttl,
        })?;
        self.inner.renew(key, ttl).await
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
