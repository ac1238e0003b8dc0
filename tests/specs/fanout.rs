// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded fan-out: every handler reports, failures stay isolated

use crate::prelude::*;

#[tokio::test]
async fn five_successes_with_concurrency_two() {
    let result = start(
        &Context::background(),
        handlers(5, |_| async { Ok("success".to_string()) }),
        2,
    )
    .await;

    assert!(result.succeed());
    assert!(result.errors().is_none());
    let values = result.results().unwrap();
    assert_eq!(values.len(), 5);
    assert!(values.iter().all(|v| v == "success"));
}

#[tokio::test]
async fn five_errors_with_concurrency_three() {
    let result = start(
        &Context::background(),
        handlers::<String, _, _>(5, |_| async { Err("error message".into()) }),
        3,
    )
    .await;

    assert!(result.failed());
    assert!(result.results().is_none());
    let errors = result.errors().unwrap();
    assert_eq!(errors.len(), 5);
    assert!(errors.iter().all(|e| e.to_string() == "error message"));
    let merged = result.merged_error().unwrap().to_string();
    assert!(merged.starts_with("5 errors occurred:"), "{merged}");
}

#[tokio::test]
async fn panic_is_reported_and_siblings_finish() {
    let mut batch = handlers(3, |_| async { Ok(1u32) });
    batch.push(Arc::new(handler_fn(|_| async {
        let explode = true;
        if explode {
            panic!("panic message");
        }
        Ok(0u32)
    })));

    let result = start(&Context::background(), batch, 2).await;

    assert_eq!(result.len(), 4);
    let errors = result.errors().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].is_panic());
    assert_eq!(errors[0].to_string(), "[PANIC]panic message");
}

#[tokio::test]
async fn handlers_observe_shared_cancellation() {
    let ctx = Context::background();
    let trigger = ctx.clone();

    let pending = start(
        &ctx,
        handlers(4, |ctx: Context| async move {
            ctx.done().await;
            Err::<(), BoxError>("cancelled".into())
        }),
        4,
    );
    let (result, ()) = tokio::join!(pending, async move {
        tokio::task::yield_now().await;
        trigger.cancel();
    });

    assert_eq!(result.errors().unwrap().len(), 4);
}
