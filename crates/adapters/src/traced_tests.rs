// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::store::{FakeLockStore, StoreCall};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

const TTL: Duration = Duration::from_millis(200);

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a test with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::default();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

// =============================================================================
// Tracing output verification tests
// =============================================================================

#[test]
fn traced_acquire_logs_span_and_outcome() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedLockStore::new(FakeLockStore::new());
        traced.acquire("job.lock", "owner-a", TTL).await
    });

    assert_eq!(result.unwrap(), AcquireReply::Acquired { count: 1 });
    assert!(logs.contains("store.acquire"), "Should log span name. Logs:\n{}", logs);
    assert!(logs.contains("job.lock"), "Should log key. Logs:\n{}", logs);
    assert!(logs.contains("owner-a"), "Should log uuid. Logs:\n{}", logs);
    assert!(logs.contains("200ms"), "Should log ttl. Logs:\n{}", logs);
    assert!(logs.contains("acquired"), "Should log completion. Logs:\n{}", logs);
    assert!(logs.contains("elapsed_ms"), "Should log timing. Logs:\n{}", logs);
}

#[test]
fn traced_acquire_logs_contention() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedLockStore::new(FakeLockStore::new());
        traced.acquire("job.lock", "owner-a", TTL).await.unwrap();
        traced.acquire("job.lock", "owner-b", TTL).await
    });

    assert_eq!(result.unwrap(), AcquireReply::Held);
    assert!(
        logs.contains("held by another owner"),
        "Should log contention. Logs:\n{}",
        logs
    );
}

#[test]
fn traced_release_logs_refusal_code() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedLockStore::new(FakeLockStore::new());
        traced.release("job.lock", "owner-a").await
    });

    assert_eq!(result.unwrap(), ReleaseReply::NotExist);
    assert!(logs.contains("store.release"), "Should log span name. Logs:\n{}", logs);
    assert!(logs.contains("release refused"), "Should log refusal. Logs:\n{}", logs);
    assert!(logs.contains("code=0"), "Should log reply code. Logs:\n{}", logs);
}

#[test]
fn traced_store_logs_failures() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeLockStore::new();
        fake.fail_with(StoreError::Connection("refused".into()));
        TracedLockStore::new(fake)
            .acquire("job.lock", "owner-a", TTL)
            .await
    });

    assert!(result.is_err());
    assert!(logs.contains("acquire failed"), "Should log failure. Logs:\n{}", logs);
    assert!(logs.contains("refused"), "Should log cause. Logs:\n{}", logs);
}

// =============================================================================
// Delegation tests - verify traced wrapper delegates to inner store
// =============================================================================

#[tokio::test]
async fn traced_store_delegates_to_inner() {
    let fake = FakeLockStore::new();
    let traced = TracedLockStore::new(fake.clone());

    traced.acquire("job.lock", "owner-a", TTL).await.unwrap();
    assert!(traced.renew("job.lock", TTL).await.unwrap());
    traced.release("job.lock", "owner-a").await.unwrap();

    let calls = fake.calls();
    assert_eq!(calls.len(), 3);
    match &calls[0] {
        StoreCall::Acquire { key, uuid, ttl } => {
            assert_eq!(key, "job.lock");
            assert_eq!(uuid, "owner-a");
            assert_eq!(*ttl, TTL);
        }
        other => panic!("Expected Acquire call, got {:?}", other),
    }
    assert!(traced.inner().record("job.lock").is_none());
}
