#![allow(dead_code)]
//! Shared integration test utilities.
//!
//! Import with:
//! ```
//! mod common;
//! use common::*;
//! ```

pub use retrack::test_utils::{init_test_logging, DeterministicSpawner, ManualProducer};

use retrack::TriggerKey;

/// Shorthand for a trigger key from a raw value.
#[must_use]
pub fn key(n: u64) -> TriggerKey {
    TriggerKey::new(n)
}
