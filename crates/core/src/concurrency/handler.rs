// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handler trait for fan-out work items

use crate::context::Context;
use async_trait::async_trait;
use std::future::Future;

/// Error type returned by handlers and coalesced functions
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A unit of work run by [`start`](super::start)
///
/// Handlers are stateless from the executor's point of view; the same handler
/// value may be shared between several batches.
#[async_trait]
pub trait Handler<T>: Send + Sync {
    async fn invoke(&self, ctx: &Context) -> Result<T, BoxError>;
}

/// Handler backed by a closure, see [`handler_fn`]
#[derive(Clone)]
pub struct HandlerFn<F> {
    f: F,
}

/// Wrap a closure as a [`Handler`]
///
/// The closure receives an owned clone of the shared context.
pub fn handler_fn<F, Fut, T>(f: F) -> HandlerFn<F>
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
{
    HandlerFn { f }
}

#[async_trait]
impl<F, Fut, T> Handler<T> for HandlerFn<F>
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
    T: Send + 'static,
{
    async fn invoke(&self, ctx: &Context) -> Result<T, BoxError> {
        (self.f)(ctx.clone()).await
    }
}
