// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process lock store
//!
//! Implements the acquire/release/renew transactions under a single mutex,
//! so each one is atomic with respect to every other caller sharing the
//! store. Leases are measured against a [`Clock`]; expired records are
//! dropped when a transaction touches them, and every acquire sweeps the
//! whole table.

use super::store::{AcquireReply, LockStore, ReleaseReply, StoreError};
use crate::clock::{Clock, SystemClock};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

/// Capacity of the release notification channel
const RELEASE_CHANNEL_CAPACITY: usize = 64;

/// A lock record as held by the store
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockRecord {
    pub owner: String,
    pub count: u64,
    pub expires_at: Instant,
}

/// Lock store living in the current process
#[derive(Clone)]
pub struct MemoryLockStore<C: Clock = SystemClock> {
    records: Arc<Mutex<HashMap<String, LockRecord>>>,
    releases: broadcast::Sender<String>,
    clock: C,
}

impl MemoryLockStore<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryLockStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryLockStore<C> {
    pub fn with_clock(clock: C) -> Self {
        let (releases, _) = broadcast::channel(RELEASE_CHANNEL_CAPACITY);
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            releases,
            clock,
        }
    }

    /// Current record for a normalized key, if the lease is still live
    pub fn record(&self, key: &str) -> Option<LockRecord> {
        let now = self.clock.now();
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        live(&mut records, key, now).cloned()
    }

    /// Number of records held in the table, expired or not
    pub fn stored_records(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Keys released by a final unlock, in release order
    pub fn subscribe_releases(&self) -> broadcast::Receiver<String> {
        self.releases.subscribe()
    }
}

/// Longest lease the store will represent
const MAX_LEASE: Duration = Duration::from_secs(60 * 60 * 24 * 365);

fn lease_end(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl.min(MAX_LEASE)).unwrap_or(now)
}

/// Look up `key`, dropping the record first if its lease has run out
fn live<'a>(
    records: &'a mut HashMap<String, LockRecord>,
    key: &str,
    now: Instant,
) -> Option<&'a mut LockRecord> {
    if records.get(key).is_some_and(|r| r.expires_at <= now) {
        records.remove(key);
    }
    records.get_mut(key)
}

#[async_trait]
impl<C: Clock> LockStore for MemoryLockStore<C> {
    async fn acquire(
        &self,
        key: &str,
        uuid: &str,
        ttl: Duration,
    ) -> Result<AcquireReply, StoreError> {
        let now = self.clock.now();
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.retain(|_, r| r.expires_at > now);

        match records.get_mut(key) {
            None => {
                records.insert(
                    key.to_string(),
                    LockRecord {
                        owner: uuid.to_string(),
                        count: 1,
                        expires_at: lease_end(now, ttl),
                    },
                );
                Ok(AcquireReply::Acquired { count: 1 })
            }
            Some(record) if record.owner == uuid => {
                record.count += 1;
                record.expires_at = lease_end(now, ttl);
                Ok(AcquireReply::Acquired {
                    count: record.count,
                })
            }
            Some(_) => Ok(AcquireReply::Held),
        }
    }

    async fn release(&self, key: &str, uuid: &str) -> Result<ReleaseReply, StoreError> {
        let now = self.clock.now();
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());

        let reply = match live(&mut records, key, now) {
            None => ReleaseReply::NotExist,
            Some(record) if record.owner != uuid => ReleaseReply::NotOwner,
            Some(record) if record.count > 1 => {
                record.count -= 1;
                ReleaseReply::Released
            }
            Some(_) => {
                records.remove(key);
                // No subscribers is not an error
                let _ = self.releases.send(key.to_string());
                ReleaseReply::Released
            }
        };
        Ok(reply)
    }

    async fn renew(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        let now = self.clock.now();
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());

        match live(&mut records, key, now) {
            Some(record) => {
                record.expires_at = lease_end(now, ttl);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
