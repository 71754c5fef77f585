//! Invocation generation numbers.
//!
//! Every started invocation is tagged with a [`Generation`]: a monotonically
//! increasing ticket identifying the most recently authorized invocation.
//! A settlement is only allowed to commit while its captured generation is
//! still the current one; anything older has been superseded and is
//! discarded.
//!
//! # Properties
//!
//! - Generations are totally ordered: `Generation(a) < Generation(b)` iff `a < b`
//! - Generations are monotonic: once generation N has been issued, N-1 is
//!   never issued again
//! - Generation 0 is the genesis value; no invocation carries it (the first
//!   started invocation is generation 1)

use core::fmt;

/// Monotonic ticket identifying one authorized invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    /// The genesis generation, before any invocation has been authorized.
    pub const GENESIS: Self = Self(0);

    /// Creates a generation from a raw value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the next generation.
    ///
    /// # Panics
    ///
    /// Panics if incrementing would overflow.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns true if this generation was issued before `other`.
    #[must_use]
    pub const fn is_before(self, other: Self) -> bool {
        self.0 < other.0
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gen({})", self.0)
    }
}

impl From<u64> for Generation {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Generation> for u64 {
    fn from(generation: Generation) -> Self {
        generation.0
    }
}
