// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lease-based distributed mutex
//!
//! This module provides:
//! - **LockStore** - the atomic keyed-store capability the mutex is built on
//! - **LockManager** - try-lock, blocking lock, unlock and lock-and-call
//! - **MemoryLockStore** - in-process store with clock-driven leases
//!
//! Lock records live only in the store. A record holds the owner's uuid and a
//! reentrancy count and carries a TTL (the lease). Acquisition and release each
//! run as one atomic store transaction; a fresh acquisition may start a
//! heartbeat task that keeps refreshing the lease while the record exists.

mod error;
mod manager;
mod memory;
mod options;
mod store;

pub use error::{LockError, LockErrorKind};
pub use manager::{normalize_key, LockGrant, LockManager, LOCK_KEY_SUFFIX};
pub use memory::{LockRecord, MemoryLockStore};
pub use options::LockOptions;
pub use store::{AcquireReply, LockStore, ReleaseReply, StoreError};
