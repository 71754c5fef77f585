//! Trigger keys supplied by the binding layer.
//!
//! A [`TriggerKey`] identifies the binding layer's current dependency set.
//! The binding layer decides *when* the set changed and informs the
//! controller via `on_trigger_changed`; the key itself is opaque to the
//! controller and is kept only for bookkeeping and diagnostics.

use core::fmt;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Opaque identifier for one dependency-set snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriggerKey(u64);

impl TriggerKey {
    /// Creates a key from a raw value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Derives a key from an arbitrary hashable dependency tuple.
    ///
    /// # Example
    ///
    /// ```
    /// use retrack::TriggerKey;
    ///
    /// let key = TriggerKey::of(&("user-42", 3usize));
    /// assert_eq!(key, TriggerKey::of(&("user-42", 3usize)));
    /// assert_ne!(key, TriggerKey::of(&("user-43", 3usize)));
    /// ```
    #[must_use]
    pub fn of<D: Hash + ?Sized>(deps: &D) -> Self {
        let mut hasher = DefaultHasher::new();
        deps.hash(&mut hasher);
        Self(hasher.finish())
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TriggerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Trigger({:#018x})", self.0)
    }
}
