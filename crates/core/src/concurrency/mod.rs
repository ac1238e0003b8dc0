// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded fan-out execution
//!
//! [`start`] runs a batch of independent [`Handler`]s with at most `concurrency`
//! of them active at once, waits for every one of them, and returns an
//! [`AggregateResult`] holding each outcome in completion order.
//!
//! A failing or panicking handler never affects its siblings: errors and
//! panics are converted to [`InvokeError`] outcomes at the worker boundary.

mod executor;
mod handler;
mod result;

pub use executor::start;
pub use handler::{handler_fn, BoxError, Handler, HandlerFn};
pub use result::{AggregateResult, InvokeError, MergedError};
