// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-acquisition lock options
///
/// Every value built through [`Default`] (including deserialization) gets a
/// fresh uuid. Passing the uuid of an earlier grant with
/// [`with_uuid`](Self::with_uuid) makes the acquisition reentrant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockOptions {
    /// Ownership token
    #[serde(skip)]
    pub uuid: String,
    /// Lease duration
    #[serde(with = "humantime_serde")]
    pub expire: Duration,
    /// Renewal interval; zero disables renewal
    #[serde(with = "humantime_serde")]
    pub heartbeat: Duration,
    /// Polling interval for blocking acquisition
    #[serde(with = "humantime_serde")]
    pub retry: Duration,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            uuid: uuid::Uuid::new_v4().to_string(),
            expire: Duration::from_millis(1000),
            heartbeat: Duration::ZERO,
            retry: Duration::from_millis(1000),
        }
    }
}

impl LockOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = uuid.into();
        self
    }

    pub fn with_expire(mut self, expire: Duration) -> Self {
        self.expire = expire;
        self
    }

    pub fn with_heartbeat(mut self, heartbeat: Duration) -> Self {
        self.heartbeat = heartbeat;
        self
    }

    pub fn with_retry(mut self, retry: Duration) -> Self {
        self.retry = retry;
        self
    }
}
