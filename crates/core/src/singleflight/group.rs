// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coalescing group keyed by logical call key

use super::error::CoalesceError;
use super::options::CallOptions;
use crate::concurrency::BoxError;
use crate::context::Context;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::watch;
use tokio::task::AbortHandle;

type Outcome<T> = Result<T, CoalesceError>;

struct Entry<T> {
    generation: u64,
    outcome: watch::Receiver<Option<Outcome<T>>>,
    expiry: AbortHandle,
}

struct Inner<T> {
    entries: Mutex<HashMap<String, Entry<T>>>,
    generations: AtomicU64,
}

impl<T> Inner<T> {
    /// Remove the entry for `key` if it still belongs to `generation`
    fn forget_generation(&self, key: &str, generation: u64) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.get(key).is_some_and(|e| e.generation == generation) {
            if let Some(entry) = entries.remove(key) {
                entry.expiry.abort();
                tracing::debug!(key, generation, "coalesced key forgotten");
            }
        }
    }
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        let entries = self.entries.get_mut().unwrap_or_else(|e| e.into_inner());
        for entry in entries.values() {
            entry.expiry.abort();
        }
    }
}

/// Forgets the entry when the shared call finishes, including by panic
struct Completion<T> {
    inner: Weak<Inner<T>>,
    key: String,
    generation: u64,
}

impl<T> Drop for Completion<T> {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.forget_generation(&self.key, self.generation);
        }
    }
}

/// Deduplicates concurrent calls sharing a key
///
/// Cloning is cheap and clones share the same set of in-flight keys.
///
/// An entry is forgotten when its call finishes or when its window
/// ([`CallOptions::expires_in`], measured from dispatch) elapses, whichever
/// comes first. A call slower than its window can therefore overlap with a
/// fresh call for the same key.
pub struct Coalescer<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Coalescer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Coalescer<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                generations: AtomicU64::new(0),
            }),
        }
    }
}

impl<T> Coalescer<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` once for all concurrent callers of `key`
    ///
    /// `f` runs in its own task with the context of the caller that
    /// dispatched it. A caller whose own context finishes first gets
    /// [`CoalesceError::Timeout`]; the shared call and other callers are not
    /// affected.
    pub async fn run<F, Fut>(
        &self,
        ctx: &Context,
        key: impl Into<String>,
        f: F,
        opts: CallOptions,
    ) -> Result<T, CoalesceError>
    where
        F: FnOnce(Context) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
    {
        let key = key.into();
        let mut outcome = self.join_or_dispatch(ctx, &key, f, &opts);

        let shared = async move {
            match outcome.wait_for(Option::is_some).await {
                Ok(value) => value.clone(),
                Err(_) => None,
            }
        };

        tokio::select! {
            _ = ctx.done() => {
                tracing::debug!(key, "caller context done before coalesced call finished");
                Err(CoalesceError::Timeout)
            }
            outcome = shared => match outcome {
                Some(outcome) => outcome,
                None => Err(CoalesceError::Aborted { key }),
            },
        }
    }

    /// Forget `key` now, so the next call dispatches fresh work
    ///
    /// Callers already waiting on the in-flight call still receive its outcome.
    pub fn forget(&self, key: &str) {
        let mut entries = self.inner.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = entries.remove(key) {
            entry.expiry.abort();
        }
    }

    /// True while `key` has a joinable entry
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(key)
    }

    fn join_or_dispatch<F, Fut>(
        &self,
        ctx: &Context,
        key: &str,
        f: F,
        opts: &CallOptions,
    ) -> watch::Receiver<Option<Outcome<T>>>
    where
        F: FnOnce(Context) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
    {
        let mut entries = self.inner.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = entries.get(key) {
            tracing::debug!(key, generation = entry.generation, "joining in-flight call");
            return entry.outcome.clone();
        }

        let generation = self.inner.generations.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = watch::channel(None);

        let completion = Completion {
            inner: Arc::downgrade(&self.inner),
            key: key.to_string(),
            generation,
        };
        let call_ctx = ctx.clone();
        tokio::spawn(async move {
            let outcome = f(call_ctx).await.map_err(CoalesceError::from);
            drop(completion);
            tx.send_replace(Some(outcome));
        });

        let weak = Arc::downgrade(&self.inner);
        let expiry_key = key.to_string();
        let expires_in = opts.expires_in;
        let expiry = tokio::spawn(async move {
            tokio::time::sleep(expires_in).await;
            if let Some(inner) = weak.upgrade() {
                inner.forget_generation(&expiry_key, generation);
            }
        })
        .abort_handle();

        tracing::debug!(
            key,
            generation,
            expires_in = %humantime::format_duration(expires_in),
            "dispatching coalesced call"
        );

        entries.insert(
            key.to_string(),
            Entry {
                generation,
                outcome: rx.clone(),
                expiry,
            },
        );
        rx
    }
}

#[cfg(test)]
#[path = "group_tests.rs"]
mod tests;
