// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock manager: acquisition, release and lease renewal

use super::error::LockError;
use super::options::LockOptions;
use super::store::{AcquireReply, LockStore, ReleaseReply};
use crate::context::Context;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

/// Suffix namespacing lock records from other keys in the same store
pub const LOCK_KEY_SUFFIX: &str = ".lock";

/// Append [`LOCK_KEY_SUFFIX`] exactly once
pub fn normalize_key(key: &str) -> String {
    let base = key.strip_suffix(LOCK_KEY_SUFFIX).unwrap_or(key);
    format!("{}{}", base, LOCK_KEY_SUFFIX)
}

/// A successful acquisition
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockGrant {
    /// Normalized store key
    pub key: String,
    /// Ownership token; pass it to `unlock` or to reenter
    pub uuid: String,
    /// Reentrancy count after this acquisition
    pub count: u64,
}

impl LockGrant {
    /// True when this acquisition created the record
    pub fn is_fresh(&self) -> bool {
        self.count == 1
    }
}

/// Distributed mutex over a [`LockStore`]
///
/// Cloning is cheap. Heartbeat tasks started by any clone stop when the lock
/// record disappears or when [`shutdown`](Self::shutdown) is called. They
/// outlive the manager itself.
#[derive(Clone)]
pub struct LockManager<S: LockStore> {
    store: S,
    shutdown: Arc<watch::Sender<bool>>,
    heartbeats: Arc<AtomicUsize>,
}

impl<S: LockStore> LockManager<S> {
    pub fn new(store: S) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            store,
            shutdown: Arc::new(shutdown),
            heartbeats: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Number of heartbeat tasks still running
    pub fn active_heartbeats(&self) -> usize {
        self.heartbeats.load(Ordering::SeqCst)
    }

    /// Stop every heartbeat task started by this manager or its clones
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Try to acquire `key` once without blocking
    ///
    /// Returns [`LockError::NotAcquired`] when another owner holds the lock.
    /// Reenters when `opts.uuid` owns the lock already. A fresh grant with a
    /// non-zero heartbeat starts lease renewal.
    pub async fn try_lock(
        &self,
        ctx: &Context,
        key: &str,
        opts: LockOptions,
    ) -> Result<LockGrant, LockError> {
        let opts = with_owner(opts);
        self.acquire(ctx, &normalize_key(key), &opts).await
    }

    /// Acquire `key`, polling every `opts.retry` until granted
    ///
    /// Returns [`LockError::Timeout`] once `ctx` is done. Store errors end
    /// the wait immediately.
    pub async fn lock(
        &self,
        ctx: &Context,
        key: &str,
        opts: LockOptions,
    ) -> Result<LockGrant, LockError> {
        let opts = with_owner(opts);
        let key = normalize_key(key);
        let mut attempts: u64 = 0;

        loop {
            match self.acquire(ctx, &key, &opts).await {
                Err(LockError::NotAcquired) => {
                    attempts += 1;
                    tracing::trace!(
                        key,
                        attempts,
                        retry = %humantime::format_duration(opts.retry),
                        "lock busy, retrying"
                    );
                    tokio::select! {
                        _ = ctx.done() => return Err(LockError::Timeout),
                        _ = tokio::time::sleep(opts.retry) => {}
                    }
                }
                other => return other,
            }
        }
    }

    /// Release one level of `key` held by `uuid`
    pub async fn unlock(&self, ctx: &Context, key: &str, uuid: &str) -> Result<(), LockError> {
        if ctx.is_done() {
            return Err(LockError::Timeout);
        }

        let key = normalize_key(key);
        let reply = self.store.release(&key, uuid).await?;
        tracing::debug!(key, uuid, code = reply.code(), "lock release");

        match reply {
            ReleaseReply::Released => Ok(()),
            ReleaseReply::NotExist => Err(LockError::NotExist),
            ReleaseReply::NotOwner => Err(LockError::NotOwner),
            ReleaseReply::DeleteFailed => Err(LockError::DeleteFailed),
        }
    }

    /// Acquire `key` (blocking), run `f`, then release
    ///
    /// The release happens whether `f` succeeds or not and is issued with a
    /// fresh context, so a caller deadline that passes during `f` does not
    /// leave the lock behind. If this future is dropped while `f` runs, the
    /// release is issued from a detached task. Release failures are logged,
    /// not returned.
    pub async fn lock_and_call<F, Fut, R, E>(
        &self,
        ctx: &Context,
        key: &str,
        f: F,
        opts: LockOptions,
    ) -> Result<R, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: From<LockError>,
    {
        let grant = self.lock(ctx, key, opts).await?;
        let mut guard = ReleaseGuard {
            manager: self.clone(),
            grant: Some(grant),
        };

        let outcome = f().await;
        guard.release().await;
        outcome
    }

    async fn acquire(
        &self,
        ctx: &Context,
        key: &str,
        opts: &LockOptions,
    ) -> Result<LockGrant, LockError> {
        if ctx.is_done() {
            return Err(LockError::Timeout);
        }

        match self.store.acquire(key, &opts.uuid, opts.expire).await? {
            AcquireReply::Held => Err(LockError::NotAcquired),
            AcquireReply::Acquired { count } => {
                tracing::debug!(key, uuid = %opts.uuid, count, "lock acquired");
                if count == 1 && !opts.heartbeat.is_zero() {
                    self.spawn_heartbeat(key.to_string(), opts.expire, opts.heartbeat);
                }
                Ok(LockGrant {
                    key: key.to_string(),
                    uuid: opts.uuid.clone(),
                    count,
                })
            }
        }
    }

    fn spawn_heartbeat(&self, key: String, expire: Duration, interval: Duration) {
        let mut shutdown = self.shutdown.subscribe();
        if *shutdown.borrow() {
            return;
        }

        let store = self.store.clone();
        let running = HeartbeatCount::enter(&self.heartbeats);
        tracing::debug!(
            key,
            expire = %humantime::format_duration(expire),
            interval = %humantime::format_duration(interval),
            "starting lease heartbeat"
        );

        tokio::spawn(async move {
            let _running = running;
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown_requested(&mut shutdown) => {
                        tracing::debug!(key, "heartbeat stopped by shutdown");
                        return;
                    }
                    _ = ticker.tick() => {}
                }

                match store.renew(&key, expire).await {
                    Ok(true) => tracing::trace!(key, "lease renewed"),
                    Ok(false) => {
                        tracing::debug!(key, "lock gone, heartbeat stopping");
                        return;
                    }
                    Err(e) => {
                        tracing::error!(key, error = %e, "lease renewal failed");
                        return;
                    }
                }
            }
        });
    }
}

/// Resolves once `shutdown()` has been called; never if the managers are gone
async fn shutdown_requested(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Fill in a fresh uuid when none was given
fn with_owner(opts: LockOptions) -> LockOptions {
    if opts.uuid.is_empty() {
        opts.with_uuid(uuid::Uuid::new_v4().to_string())
    } else {
        opts
    }
}

/// Tracks a running heartbeat task in the manager's counter
struct HeartbeatCount {
    count: Arc<AtomicUsize>,
}

impl HeartbeatCount {
    fn enter(count: &Arc<AtomicUsize>) -> Self {
        count.fetch_add(1, Ordering::SeqCst);
        Self {
            count: Arc::clone(count),
        }
    }
}

impl Drop for HeartbeatCount {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Releases a grant exactly once, from a detached task if dropped unreleased
struct ReleaseGuard<S: LockStore> {
    manager: LockManager<S>,
    grant: Option<LockGrant>,
}

impl<S: LockStore> ReleaseGuard<S> {
    async fn release(&mut self) {
        if let Some(grant) = self.grant.take() {
            release_logged(&self.manager, &grant).await;
        }
    }
}

impl<S: LockStore> Drop for ReleaseGuard<S> {
    fn drop(&mut self) {
        let Some(grant) = self.grant.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let manager = self.manager.clone();
                handle.spawn(async move {
                    release_logged(&manager, &grant).await;
                });
            }
            Err(_) => {
                tracing::warn!(key = %grant.key, "no runtime to release lock, leaving it to expire");
            }
        }
    }
}

async fn release_logged<S: LockStore>(manager: &LockManager<S>, grant: &LockGrant) {
    if let Err(e) = manager
        .unlock(&Context::background(), &grant.key, &grant.uuid)
        .await
    {
        tracing::warn!(key = %grant.key, error = %e, "unlock after call failed");
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
