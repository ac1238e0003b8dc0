// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-call coalescing options
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallOptions {
    /// How long after the first dispatch the key stays joinable
    #[serde(with = "humantime_serde")]
    pub expires_in: Duration,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            expires_in: Duration::from_secs(1),
        }
    }
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
        self.expires_in = expires_in;
        self
    }
}
