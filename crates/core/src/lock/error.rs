// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::store::StoreError;
use thiserror::Error;

/// Errors returned by [`LockManager`](super::LockManager)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    /// Blocking acquisition gave up because the context finished
    #[error("timeout")]
    Timeout,
    /// Another owner holds the lock
    #[error("lock not acquired")]
    NotAcquired,
    /// Release of a lock that is not held
    #[error("lock does not exist")]
    NotExist,
    /// Release with a uuid that does not own the lock
    #[error("not the owner of the lock")]
    NotOwner,
    /// The store failed to delete the record on final release
    #[error("lock key delete failed")]
    DeleteFailed,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Closed set of [`LockError`] kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockErrorKind {
    Timeout,
    NotAcquired,
    NotExist,
    NotOwner,
    DeleteFailed,
    Store,
}

impl LockError {
    pub fn kind(&self) -> LockErrorKind {
        match self {
            LockError::Timeout => LockErrorKind::Timeout,
            LockError::NotAcquired => LockErrorKind::NotAcquired,
            LockError::NotExist => LockErrorKind::NotExist,
            LockError::NotOwner => LockErrorKind::NotOwner,
            LockError::DeleteFailed => LockErrorKind::DeleteFailed,
            LockError::Store(_) => LockErrorKind::Store,
        }
    }

    pub fn is(&self, kind: LockErrorKind) -> bool {
        self.kind() == kind
    }

    pub fn is_timeout(&self) -> bool {
        self.is(LockErrorKind::Timeout)
    }

    pub fn is_lock_not_acquired(&self) -> bool {
        self.is(LockErrorKind::NotAcquired)
    }

    pub fn is_lock_not_exist(&self) -> bool {
        self.is(LockErrorKind::NotExist)
    }

    pub fn is_not_owner_of_lock(&self) -> bool {
        self.is(LockErrorKind::NotOwner)
    }
}
