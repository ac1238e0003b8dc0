// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Distributed mutex over the fake and traced stores

use crate::prelude::*;
use lockstep_adapters::{FakeLockStore, StoreCall, TracedLockStore};
use lockstep_core::StoreError;

fn opts() -> LockOptions {
    LockOptions::new()
        .with_expire(Duration::from_millis(200))
        .with_retry(Duration::from_millis(20))
}

#[tokio::test]
async fn exactly_one_fresh_winner() {
    let manager = LockManager::new(FakeLockStore::new());
    let ctx = Context::background();

    let mut wins = 0;
    for _ in 0..5 {
        if manager.try_lock(&ctx, "job", opts()).await.is_ok() {
            wins += 1;
        }
    }

    assert_eq!(wins, 1);
}

#[tokio::test]
async fn keys_are_normalized_before_reaching_the_store() {
    let store = FakeLockStore::new();
    let manager = LockManager::new(TracedLockStore::new(store.clone()));
    let ctx = Context::background();

    let grant = manager.try_lock(&ctx, "job", opts()).await.unwrap();
    manager.unlock(&ctx, "job.lock", &grant.uuid).await.unwrap();

    let keys: Vec<_> = store
        .calls()
        .into_iter()
        .map(|call| match call {
            StoreCall::Acquire { key, .. } | StoreCall::Release { key, .. } => key,
            StoreCall::Renew { key, .. } => key,
        })
        .collect();
    assert_eq!(keys, vec!["job.lock", "job.lock"]);
}

#[tokio::test]
async fn reentrant_grant_needs_two_releases() {
    let store = FakeLockStore::new();
    let manager = LockManager::new(store.clone());
    let ctx = Context::background();

    let first = manager.try_lock(&ctx, "job", opts()).await.unwrap();
    let second = manager
        .try_lock(&ctx, "job", opts().with_uuid(first.uuid.clone()))
        .await
        .unwrap();
    assert_eq!(second.count, 2);

    manager.unlock(&ctx, "job", &first.uuid).await.unwrap();
    assert!(manager.try_lock(&ctx, "job", opts()).await.is_err());
    manager.unlock(&ctx, "job", &first.uuid).await.unwrap();
    assert!(manager.try_lock(&ctx, "job", opts()).await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn heartbeat_renews_until_release() {
    let store = FakeLockStore::new();
    let manager = LockManager::new(store.clone());
    let ctx = Context::background();
    let grant = manager
        .try_lock(&ctx, "job", opts().with_heartbeat(Duration::from_millis(50)))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(175)).await;
    assert_eq!(store.renewals(), 3);

    manager.unlock(&ctx, "job", &grant.uuid).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(store.renewals(), 4);
    assert_eq!(manager.active_heartbeats(), 0);
}

#[tokio::test(start_paused = true)]
async fn heartbeat_stops_on_store_failure() {
    let store = FakeLockStore::new();
    let manager = LockManager::new(store.clone());
    let ctx = Context::background();
    manager
        .try_lock(&ctx, "job", opts().with_heartbeat(Duration::from_millis(50)))
        .await
        .unwrap();

    store.fail_with(StoreError::Connection("gone".into()));
    tokio::time::sleep(Duration::from_millis(75)).await;

    assert_eq!(manager.active_heartbeats(), 0);
    assert_eq!(store.renewals(), 1);
}

#[tokio::test(start_paused = true)]
async fn blocking_lock_gives_up_with_timeout() {
    let manager = LockManager::new(FakeLockStore::new());
    manager
        .try_lock(&Context::background(), "job", opts())
        .await
        .unwrap();
    let ctx = Context::background().with_timeout(Duration::from_millis(100));

    let err = manager.lock(&ctx, "job", opts()).await.unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(err.to_string(), "timeout");
}

#[tokio::test]
async fn lock_and_call_runs_exclusively_and_releases() {
    let store = FakeLockStore::new();
    let manager = LockManager::new(store.clone());
    let ctx = Context::background();

    let out = manager
        .lock_and_call(
            &ctx,
            "job",
            || async { Ok::<_, LockError>("done") },
            opts(),
        )
        .await
        .unwrap();

    assert_eq!(out, "done");
    assert!(store.record("job.lock").is_none());
}
