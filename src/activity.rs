//! Context liveness flag checked before every commit.
//!
//! An [`ActivityToken`] is created alongside the owning context and flipped
//! exactly once when that context is torn down. The controller reads it at
//! every commit decision; the teardown routine is the only writer. The flag
//! is atomic so a host that drives settlements on another OS thread still
//! observes teardown without locks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Single-writer, multiple-reader liveness flag.
///
/// Cloning shares the underlying flag; all clones observe the same
/// teardown.
#[derive(Debug, Clone, Default)]
pub struct ActivityToken {
    torn_down: Arc<AtomicBool>,
}

impl ActivityToken {
    /// Creates a live token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once the owning context has been torn down.
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }

    /// Marks the owning context as torn down.
    ///
    /// Idempotent. Returns true only for the call that performed the
    /// transition; later calls return false.
    pub fn tear_down(&self) -> bool {
        !self.torn_down.swap(true, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_live() {
        let token = ActivityToken::new();
        assert!(!token.is_torn_down());
    }

    #[test]
    fn tear_down_is_irreversible() {
        let token = ActivityToken::new();
        assert!(token.tear_down());
        assert!(token.is_torn_down());
    }

    #[test]
    fn tear_down_is_idempotent() {
        let token = ActivityToken::new();
        assert!(token.tear_down());
        assert!(!token.tear_down());
        assert!(!token.tear_down());
        assert!(token.is_torn_down());
    }

    #[test]
    fn clones_share_the_flag() {
        let token = ActivityToken::new();
        let reader = token.clone();
        token.tear_down();
        assert!(reader.is_torn_down());
    }
}
