// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request coalescing
//!
//! A [`Coalescer`] deduplicates concurrent calls that share a key: the first
//! call dispatches the work, later calls for the same key join it, and every
//! caller observes the same outcome. Entries are forgotten a fixed window
//! after the first dispatch, so this is deduplication of concurrent work, not
//! a cache.

mod error;
mod group;
mod options;

pub use error::CoalesceError;
pub use group::Coalescer;
pub use options::CallOptions;
