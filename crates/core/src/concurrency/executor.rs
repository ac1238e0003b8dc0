// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor and worker tasks for bounded fan-out

use super::handler::Handler;
use super::result::{AggregateResult, InvokeError};
use crate::context::Context;
use std::any::Any;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

/// Run `handlers` with at most `concurrency` active at a time
///
/// A supervising task walks the handlers in order, taking one permit per
/// handler before spawning it, so throughput is limited only by permit
/// availability. Returns once every handler has completed. A `concurrency`
/// of zero is treated as one.
///
/// The context is passed to every handler as-is; the executor never cancels
/// handlers itself.
pub async fn start<T>(
    ctx: &Context,
    handlers: Vec<Arc<dyn Handler<T>>>,
    concurrency: u8,
) -> AggregateResult<T>
where
    T: Send + Sync + 'static,
{
    let result = AggregateResult::new();
    let total = handlers.len();
    let concurrency = usize::from(concurrency.max(1));
    let started = std::time::Instant::now();

    tracing::debug!(handlers = total, concurrency, "fan-out starting");

    let supervisor = {
        let ctx = ctx.clone();
        let result = result.clone();
        tokio::spawn(async move {
            let permits = Arc::new(Semaphore::new(concurrency));
            let mut workers = JoinSet::new();

            for handler in handlers {
                // The semaphore is never closed
                let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                    break;
                };

                let ctx = ctx.clone();
                let result = result.clone();
                workers.spawn(async move {
                    let task = tokio::spawn(async move {
                        let _permit = permit;
                        handler.invoke(&ctx).await
                    });

                    let outcome = match task.await {
                        Ok(Ok(value)) => Ok(value),
                        Ok(Err(err)) => Err(InvokeError::from(err)),
                        Err(err) => Err(join_failure(err)),
                    };
                    result.append(outcome);
                });
            }

            while workers.join_next().await.is_some() {}
        })
    };

    if let Err(err) = supervisor.await {
        tracing::error!(error = %err, "fan-out supervisor failed");
    }

    tracing::debug!(
        handlers = total,
        failed = result.failed(),
        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        "fan-out complete"
    );

    result
}

fn join_failure(err: JoinError) -> InvokeError {
    if err.is_panic() {
        let message = panic_message(err.into_panic());
        tracing::warn!(panic = %message, "handler panicked");
        InvokeError::Panicked(message)
    } else {
        InvokeError::Cancelled
    }
}

fn panic_message(payload: Box<dyn Any + Send + 'static>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(message) => (*message).to_string(),
            Err(_) => "unknown panic payload".to_string(),
        },
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
