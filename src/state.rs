//! Five-valued lifecycle state for one slot of asynchronous work.
//!
//! [`AsyncState`] is the single observable value a controller maintains:
//!
//! - `Idle`: no invocation has ever started (lazy controllers only)
//! - `Pending`: an invocation is outstanding, no prior success is held
//! - `Succeeded { data }`: the most recent committed invocation resolved
//! - `Reloading { data }`: a new invocation is outstanding while the
//!   previous success is still held for display continuity
//! - `Failed { error }`: the most recent committed invocation rejected
//!
//! Exactly one variant is active at any observed instant. Transitions
//! always construct a fresh, fully-specified variant; no field of a
//! previous variant ever leaks into the next one, which structurally rules
//! out mixed states such as stale data surviving into `Failed`.
//!
//! `Reloading` is only reachable from `Succeeded`: a failed slot that is
//! re-invoked goes through `Pending`, dropping the error and holding no
//! data.

use core::fmt;
use thiserror::Error;

/// The lifecycle state of one tracked asynchronous operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsyncState<T, E> {
    /// No invocation has ever started.
    Idle,
    /// An invocation is outstanding and no prior success is held.
    Pending,
    /// The most recent committed invocation resolved with `data`.
    Succeeded {
        /// Payload of the most recently committed invocation.
        data: T,
    },
    /// A new invocation is outstanding; `data` from the previous success
    /// is retained so consumers can keep rendering it.
    Reloading {
        /// Payload of the previously committed success.
        data: T,
    },
    /// The most recent committed invocation rejected with `error`.
    Failed {
        /// The opaque value the producer rejected with.
        error: E,
    },
}

impl<T, E> AsyncState<T, E> {
    /// Returns true while no settled value is available: `Idle` or
    /// `Pending`.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Idle | Self::Pending)
    }

    /// Returns true when a payload is held: `Succeeded` or `Reloading`.
    #[must_use]
    pub const fn has_data(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Reloading { .. })
    }

    /// Returns true when the slot holds a producer rejection.
    #[must_use]
    pub const fn has_error(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Returns true only for `Idle`.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns true only for `Reloading`.
    #[must_use]
    pub const fn is_reloading(&self) -> bool {
        matches!(self, Self::Reloading { .. })
    }

    /// Returns the held payload, if any.
    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        match self {
            Self::Succeeded { data } | Self::Reloading { data } => Some(data),
            _ => None,
        }
    }

    /// Returns the held rejection, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&E> {
        match self {
            Self::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// Consumes the state, returning the held payload if any.
    #[must_use]
    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Succeeded { data } | Self::Reloading { data } => Some(data),
            _ => None,
        }
    }

    /// Short name of the active variant, for log fields and display.
    #[must_use]
    pub const fn phase_name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending => "pending",
            Self::Succeeded { .. } => "succeeded",
            Self::Reloading { .. } => "reloading",
            Self::Failed { .. } => "failed",
        }
    }

    /// Maps the payload, preserving the variant.
    ///
    /// # Example
    ///
    /// ```
    /// use retrack::AsyncState;
    ///
    /// let s: AsyncState<u32, ()> = AsyncState::Succeeded { data: 21 };
    /// assert_eq!(s.map(|v| v * 2), AsyncState::Succeeded { data: 42 });
    /// ```
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> AsyncState<U, E> {
        match self {
            Self::Idle => AsyncState::Idle,
            Self::Pending => AsyncState::Pending,
            Self::Succeeded { data } => AsyncState::Succeeded { data: f(data) },
            Self::Reloading { data } => AsyncState::Reloading { data: f(data) },
            Self::Failed { error } => AsyncState::Failed { error },
        }
    }

    /// Maps the rejection, preserving the variant.
    pub fn map_err<F2, G: FnOnce(E) -> F2>(self, g: G) -> AsyncState<T, F2> {
        match self {
            Self::Idle => AsyncState::Idle,
            Self::Pending => AsyncState::Pending,
            Self::Succeeded { data } => AsyncState::Succeeded { data },
            Self::Reloading { data } => AsyncState::Reloading { data },
            Self::Failed { error } => AsyncState::Failed { error: g(error) },
        }
    }

    /// Converts this state to a standard `Result`.
    ///
    /// `Succeeded` and `Reloading` yield the payload; every other variant
    /// becomes a [`StateError`].
    pub fn into_result(self) -> Result<T, StateError<E>> {
        match self {
            Self::Succeeded { data } | Self::Reloading { data } => Ok(data),
            Self::Idle => Err(StateError::Idle),
            Self::Pending => Err(StateError::InFlight),
            Self::Failed { error } => Err(StateError::Rejected(error)),
        }
    }
}

impl<T, E> From<Result<T, E>> for AsyncState<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::Succeeded { data },
            Err(error) => Self::Failed { error },
        }
    }
}

impl<T, E> fmt::Display for AsyncState<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phase_name())
    }
}

/// Error returned by [`AsyncState::into_result`] when no payload is held.
///
/// `Rejected` carries the producer's opaque rejection value; the other
/// variants describe a slot that has not settled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError<E> {
    /// No invocation has ever started.
    #[error("no invocation has started")]
    Idle,
    /// An invocation is still in flight and no prior success is held.
    #[error("invocation still in flight")]
    InFlight,
    /// The most recent committed invocation rejected.
    #[error("producer rejected")]
    Rejected(E),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_variants() -> Vec<AsyncState<&'static str, &'static str>> {
        vec![
            AsyncState::Idle,
            AsyncState::Pending,
            AsyncState::Succeeded { data: "d" },
            AsyncState::Reloading { data: "d" },
            AsyncState::Failed { error: "e" },
        ]
    }

    // =========================================================================
    // Query Helper Truth Tables
    // =========================================================================

    #[test]
    fn is_pending_for_idle_and_pending_only() {
        let expected = [true, true, false, false, false];
        for (state, want) in all_variants().into_iter().zip(expected) {
            assert_eq!(state.is_pending(), want, "state {state}");
        }
    }

    #[test]
    fn has_data_for_succeeded_and_reloading_only() {
        let expected = [false, false, true, true, false];
        for (state, want) in all_variants().into_iter().zip(expected) {
            assert_eq!(state.has_data(), want, "state {state}");
        }
    }

    #[test]
    fn has_error_for_failed_only() {
        let expected = [false, false, false, false, true];
        for (state, want) in all_variants().into_iter().zip(expected) {
            assert_eq!(state.has_error(), want, "state {state}");
        }
    }

    #[test]
    fn data_defined_exactly_when_has_data() {
        for state in all_variants() {
            assert_eq!(state.data().is_some(), state.has_data());
        }
    }

    #[test]
    fn error_defined_exactly_when_has_error() {
        for state in all_variants() {
            assert_eq!(state.error().is_some(), state.has_error());
        }
    }

    // =========================================================================
    // Accessors and Conversions
    // =========================================================================

    #[test]
    fn data_reads_payload() {
        let s: AsyncState<i32, ()> = AsyncState::Reloading { data: 7 };
        assert_eq!(s.data(), Some(&7));
        assert_eq!(s.into_data(), Some(7));
    }

    #[test]
    fn into_result_yields_payload_for_both_data_variants() {
        let ok: AsyncState<i32, &str> = AsyncState::Succeeded { data: 1 };
        let reloading: AsyncState<i32, &str> = AsyncState::Reloading { data: 2 };
        assert_eq!(ok.into_result(), Ok(1));
        assert_eq!(reloading.into_result(), Ok(2));
    }

    #[test]
    fn into_result_classifies_unsettled_slots() {
        let idle: AsyncState<i32, &str> = AsyncState::Idle;
        let pending: AsyncState<i32, &str> = AsyncState::Pending;
        assert_eq!(idle.into_result(), Err(StateError::Idle));
        assert_eq!(pending.into_result(), Err(StateError::InFlight));
    }

    #[test]
    fn into_result_carries_the_rejection() {
        let failed: AsyncState<i32, &str> = AsyncState::Failed { error: "boom" };
        assert_eq!(failed.into_result(), Err(StateError::Rejected("boom")));
    }

    #[test]
    fn from_result_builds_settled_variants() {
        let ok: AsyncState<i32, &str> = Ok(42).into();
        let err: AsyncState<i32, &str> = Err("boom").into();
        assert_eq!(ok, AsyncState::Succeeded { data: 42 });
        assert_eq!(err, AsyncState::Failed { error: "boom" });
    }

    // =========================================================================
    // Map Operations
    // =========================================================================

    #[test]
    fn map_transforms_both_data_variants() {
        let ok: AsyncState<i32, ()> = AsyncState::Succeeded { data: 3 };
        let reloading: AsyncState<i32, ()> = AsyncState::Reloading { data: 4 };
        assert_eq!(ok.map(|v| v + 1), AsyncState::Succeeded { data: 4 });
        assert_eq!(reloading.map(|v| v + 1), AsyncState::Reloading { data: 5 });
    }

    #[test]
    fn map_preserves_failed() {
        let failed: AsyncState<i32, &str> = AsyncState::Failed { error: "e" };
        assert_eq!(failed.map(|v| v + 1), AsyncState::Failed { error: "e" });
    }

    #[test]
    fn map_err_only_touches_failed() {
        let failed: AsyncState<i32, &str> = AsyncState::Failed { error: "abc" };
        let pending: AsyncState<i32, &str> = AsyncState::Pending;
        assert_eq!(failed.map_err(str::len), AsyncState::Failed { error: 3 });
        assert_eq!(pending.map_err(str::len), AsyncState::Pending);
    }

    // =========================================================================
    // Display
    // =========================================================================

    #[test]
    fn phase_names() {
        let names: Vec<&str> = all_variants().iter().map(AsyncState::phase_name).collect();
        assert_eq!(
            names,
            ["idle", "pending", "succeeded", "reloading", "failed"]
        );
    }

    #[test]
    fn display_matches_phase_name() {
        for state in all_variants() {
            assert_eq!(state.to_string(), state.phase_name());
        }
    }

    #[test]
    fn state_error_display() {
        let rejected: StateError<&str> = StateError::Rejected("boom");
        assert_eq!(StateError::<&str>::Idle.to_string(), "no invocation has started");
        assert_eq!(
            StateError::<&str>::InFlight.to_string(),
            "invocation still in flight"
        );
        assert_eq!(rejected.to_string(), "producer rejected");
    }
}
