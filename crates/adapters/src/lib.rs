// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Lock store adapters and client configuration

pub mod config;
pub mod registry;
pub mod store;
pub mod traced;

pub use config::{ClientConfig, ConfigError, ServiceConfig};
pub use registry::{RegistryError, StoreConnector, StoreRegistry};
pub use traced::TracedLockStore;

#[cfg(feature = "redis")]
pub use registry::RedisConnector;
#[cfg(feature = "redis")]
pub use store::RedisLockStore;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use store::{FakeLockStore, StoreCall};
