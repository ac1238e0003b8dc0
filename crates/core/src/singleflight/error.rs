// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::concurrency::BoxError;
use std::sync::Arc;
use thiserror::Error;

/// Errors observed by callers of [`Coalescer::run`](super::Coalescer::run)
#[derive(Debug, Clone, Error)]
pub enum CoalesceError {
    /// The caller's own context finished before the shared call did
    #[error("timeout")]
    Timeout,
    /// The shared call returned an error
    #[error("{0}")]
    Failed(Arc<dyn std::error::Error + Send + Sync + 'static>),
    /// The shared call panicked or was aborted before producing an outcome
    #[error("coalesced call for {key} aborted")]
    Aborted { key: String },
}

impl CoalesceError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, CoalesceError::Timeout)
    }
}

impl From<BoxError> for CoalesceError {
    fn from(err: BoxError) -> Self {
        CoalesceError::Failed(Arc::from(err))
    }
}
