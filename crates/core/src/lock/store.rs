// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic keyed-store capability used by the lock manager

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors from the backing store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store connection failed: {0}")]
    Connection(String),
    #[error("store command failed: {0}")]
    Command(String),
    #[error("unexpected store reply: {0}")]
    UnexpectedReply(i64),
}

/// Result of the acquire transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireReply {
    /// Granted; `count` is the reentrancy count after this acquisition
    Acquired { count: u64 },
    /// Held by a different owner
    Held,
}

impl AcquireReply {
    /// Decode the script reply: `0` held, `n >= 1` acquired with count `n`
    pub fn from_code(code: i64) -> Result<Self, StoreError> {
        match code {
            0 => Ok(AcquireReply::Held),
            n if n > 0 => Ok(AcquireReply::Acquired { count: n.unsigned_abs() }),
            n => Err(StoreError::UnexpectedReply(n)),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            AcquireReply::Held => 0,
            AcquireReply::Acquired { count } => *count as i64,
        }
    }
}

/// Result of the release transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseReply {
    NotExist,
    NotOwner,
    DeleteFailed,
    Released,
}

impl ReleaseReply {
    /// Decode the script reply: `0` absent, `1` uuid mismatch, `2` delete
    /// failed, `666` success
    pub fn from_code(code: i64) -> Result<Self, StoreError> {
        match code {
            0 => Ok(ReleaseReply::NotExist),
            1 => Ok(ReleaseReply::NotOwner),
            2 => Ok(ReleaseReply::DeleteFailed),
            666 => Ok(ReleaseReply::Released),
            n => Err(StoreError::UnexpectedReply(n)),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            ReleaseReply::NotExist => 0,
            ReleaseReply::NotOwner => 1,
            ReleaseReply::DeleteFailed => 2,
            ReleaseReply::Released => 666,
        }
    }
}

/// A keyed store able to run the lock transactions atomically
///
/// Keys passed in are already normalized by the manager.
#[async_trait]
pub trait LockStore: Clone + Send + Sync + 'static {
    /// Create the record for `uuid` with count 1, or increment it when `uuid`
    /// already owns it. Either way the TTL is set to `ttl`.
    async fn acquire(&self, key: &str, uuid: &str, ttl: Duration)
        -> Result<AcquireReply, StoreError>;

    /// Decrement the owner's count, deleting the record and publishing a
    /// release notification when it would reach zero.
    async fn release(&self, key: &str, uuid: &str) -> Result<ReleaseReply, StoreError>;

    /// Refresh the TTL if the record exists. Returns false when it does not.
    async fn renew(&self, key: &str, ttl: Duration) -> Result<bool, StoreError>;
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
