// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn background_context_is_not_done() {
    let ctx = Context::background();
    assert!(!ctx.is_done());
    assert!(ctx.deadline().is_none());
}

#[tokio::test]
async fn cancel_is_shared_with_derived_contexts() {
    let parent = Context::background();
    let child = parent.with_timeout(Duration::from_secs(60));

    parent.cancel();

    assert!(child.is_cancelled());
    assert!(child.is_done());
    child.done().await;
}

#[tokio::test(start_paused = true)]
async fn deadline_completes_done() {
    let ctx = Context::background().with_timeout(Duration::from_millis(100));
    let start = Instant::now();

    ctx.done().await;

    assert!(start.elapsed() >= Duration::from_millis(100));
    assert!(ctx.is_done());
    assert!(!ctx.is_cancelled());
}

#[tokio::test]
async fn unrepresentable_timeout_adds_no_deadline() {
    let ctx = Context::background().with_timeout(Duration::MAX);
    assert!(ctx.deadline().is_none());
    assert!(!ctx.is_done());

    let short = Context::background().with_timeout(Duration::from_secs(1));
    assert_eq!(short.with_timeout(Duration::MAX).deadline(), short.deadline());
}

#[tokio::test(start_paused = true)]
async fn derived_context_keeps_earlier_deadline() {
    let short = Context::background().with_timeout(Duration::from_millis(10));
    let derived = short.with_timeout(Duration::from_secs(10));

    assert_eq!(derived.deadline(), short.deadline());
}

#[tokio::test(start_paused = true)]
async fn cancel_wakes_pending_done() {
    let ctx = Context::background();
    let waiter = {
        let ctx = ctx.clone();
        tokio::spawn(async move { ctx.done().await })
    };

    tokio::time::sleep(Duration::from_millis(5)).await;
    assert!(!waiter.is_finished());

    ctx.cancel();
    waiter.await.unwrap();
}
