// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for the behavioural specs

pub use lockstep_core::{
    handler_fn, start, BoxError, CallOptions, CoalesceError, Coalescer, Context, Handler,
    LockError, LockManager, LockOptions,
};
pub use std::sync::Arc;
pub use std::time::Duration;

/// `n` copies of a closure handler, ready for [`start`]
pub fn handlers<T, F, Fut>(n: usize, f: F) -> Vec<Arc<dyn Handler<T>>>
where
    T: Send + 'static,
    F: Fn(Context) -> Fut + Clone + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<T, BoxError>> + Send + 'static,
{
    (0..n)
        .map(|_| Arc::new(handler_fn(f.clone())) as Arc<dyn Handler<T>>)
        .collect()
}
