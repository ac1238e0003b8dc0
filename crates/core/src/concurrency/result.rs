// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Aggregated outcomes of a fan-out batch

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use thiserror::Error;

use super::handler::BoxError;

/// Failure of a single handler
#[derive(Debug, Clone, Error)]
pub enum InvokeError {
    /// The handler returned an error
    #[error("{0}")]
    Failed(Arc<dyn std::error::Error + Send + Sync + 'static>),
    /// The handler panicked
    #[error("[PANIC]{0}")]
    Panicked(String),
    /// The handler's task was cancelled before it finished
    #[error("handler task cancelled")]
    Cancelled,
}

impl InvokeError {
    pub fn is_panic(&self) -> bool {
        matches!(self, InvokeError::Panicked(_))
    }
}

impl From<BoxError> for InvokeError {
    fn from(err: BoxError) -> Self {
        InvokeError::Failed(Arc::from(err))
    }
}

/// All failures of a batch rendered as one error
///
/// ```text
/// 2 errors occurred:
///     * error message
///     * [PANIC]panic message
/// ```
#[derive(Debug, Clone)]
pub struct MergedError {
    errors: Vec<InvokeError>,
}

impl MergedError {
    pub fn errors(&self) -> &[InvokeError] {
        &self.errors
    }
}

impl fmt::Display for MergedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} errors occurred:", self.errors.len())?;
        for err in &self.errors {
            write!(f, "\n    * {}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for MergedError {}

/// Outcomes of every handler of one [`start`](super::start) call
///
/// Outcomes are kept in completion order. Cloning shares the underlying set.
#[derive(Debug)]
pub struct AggregateResult<T> {
    outcomes: Arc<RwLock<Vec<Result<T, InvokeError>>>>,
    failed: Arc<AtomicBool>,
}

impl<T> Clone for AggregateResult<T> {
    fn clone(&self) -> Self {
        Self {
            outcomes: Arc::clone(&self.outcomes),
            failed: Arc::clone(&self.failed),
        }
    }
}

impl<T> Default for AggregateResult<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AggregateResult<T> {
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(RwLock::new(Vec::new())),
            failed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True when no handler failed
    pub fn succeed(&self) -> bool {
        !self.failed()
    }

    /// True when at least one handler failed
    pub fn failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    /// Number of recorded outcomes
    pub fn len(&self) -> usize {
        self.outcomes.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Errors in completion order, `None` when nothing failed
    pub fn errors(&self) -> Option<Vec<InvokeError>> {
        if self.succeed() {
            return None;
        }

        let outcomes = self.outcomes.read().unwrap_or_else(|e| e.into_inner());
        Some(
            outcomes
                .iter()
                .filter_map(|outcome| outcome.as_ref().err().cloned())
                .collect(),
        )
    }

    /// All failures merged into a single error, `None` when nothing failed
    pub fn merged_error(&self) -> Option<MergedError> {
        self.errors().map(|errors| MergedError { errors })
    }

    pub(crate) fn append(&self, outcome: Result<T, InvokeError>) {
        let mut outcomes = self.outcomes.write().unwrap_or_else(|e| e.into_inner());
        if outcome.is_err() {
            self.failed.store(true, Ordering::Release);
        }
        outcomes.push(outcome);
    }
}

impl<T: Clone> AggregateResult<T> {
    /// Values in completion order
    ///
    /// All or nothing: returns `None` as soon as any handler failed, partial
    /// successes are never exposed.
    pub fn results(&self) -> Option<Vec<T>> {
        if self.failed() {
            return None;
        }

        let outcomes = self.outcomes.read().unwrap_or_else(|e| e.into_inner());
        Some(
            outcomes
                .iter()
                .filter_map(|outcome| outcome.as_ref().ok().cloned())
                .collect(),
        )
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
