// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request coalescing: one execution per key per window

use crate::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

#[tokio::test(start_paused = true)]
async fn concurrent_callers_share_one_execution() {
    let coalescer = Coalescer::<u64>::new();
    let executions = Arc::new(AtomicUsize::new(0));
    let ctx = Context::background();

    let mut callers = Vec::new();
    for _ in 0..8 {
        let coalescer = coalescer.clone();
        let executions = Arc::clone(&executions);
        let ctx = ctx.clone();
        callers.push(tokio::spawn(async move {
            coalescer
                .run(
                    &ctx,
                    "user:42",
                    move |_| async move {
                        executions.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        Ok(42)
                    },
                    CallOptions::new(),
                )
                .await
        }));
    }

    for caller in callers {
        assert_eq!(caller.await.unwrap().unwrap(), 42);
    }
    assert_eq!(executions.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn impatient_waiter_times_out_alone() {
    let coalescer = Coalescer::<u64>::new();
    let patient = Context::background();
    let impatient = Context::background().with_timeout(Duration::from_millis(50));

    let slow = |_: Context| async {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok::<u64, BoxError>(7)
    };

    let (a, b) = tokio::join!(
        coalescer.run(&patient, "slow", slow, CallOptions::new()),
        coalescer.run(&impatient, "slow", slow, CallOptions::new()),
    );

    assert_eq!(a.unwrap(), 7);
    assert!(b.unwrap_err().is_timeout());
}

#[tokio::test(start_paused = true)]
async fn failure_reaches_every_caller() {
    let coalescer = Coalescer::<u64>::new();
    let ctx = Context::background();

    let failing = |_: Context| async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        Err::<u64, BoxError>("backend down".into())
    };

    let (a, b) = tokio::join!(
        coalescer.run(&ctx, "k", failing, CallOptions::new()),
        coalescer.run(&ctx, "k", failing, CallOptions::new()),
    );

    assert_eq!(a.unwrap_err().to_string(), "backend down");
    assert_eq!(b.unwrap_err().to_string(), "backend down");
}
