// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! lockstep-core: concurrency-control primitives for async services
//!
//! This crate provides:
//! - Bounded fan-out execution of independent handlers with aggregated results
//! - Request coalescing of concurrent calls that share a key
//! - A lease-based distributed mutex over an atomic keyed store

pub mod clock;
pub mod context;

pub mod concurrency;
pub mod lock;
pub mod singleflight;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use context::Context;

pub use concurrency::{
    handler_fn, start, AggregateResult, BoxError, Handler, HandlerFn, InvokeError, MergedError,
};
pub use lock::{
    normalize_key, AcquireReply, LockError, LockErrorKind, LockGrant, LockManager, LockOptions,
    LockRecord, LockStore, MemoryLockStore, ReleaseReply, StoreError, LOCK_KEY_SUFFIX,
};
pub use singleflight::{CallOptions, CoalesceError, Coalescer};
