//! Tracing compatibility layer for structured logging.
//!
//! Provides one import site for log macros that works whether or not the
//! `tracing-integration` feature is enabled:
//!
//! - **With the feature**: re-exports the macros from the `tracing` crate.
//! - **Without it**: no-op macros that compile to nothing, so the core has
//!   zero logging overhead by default.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::tracing_compat::{debug, error, trace};
//!
//! debug!(generation = 3, is_rerun = false, "invocation started");
//! ```
//!
//! # Feature Flag
//!
//! Enable real output by turning the feature on:
//!
//! ```toml
//! retrack = { version = "0.1", features = ["tracing-integration"] }
//! ```

#[cfg(feature = "tracing-integration")]
pub use tracing::{debug, error, info, trace, warn};

// When tracing is disabled, provide no-op macros
#[cfg(not(feature = "tracing-integration"))]
mod noop {
    //! No-op implementations when tracing is disabled.
    //!
    //! These macros expand to nothing, ensuring zero compile-time and runtime cost.

    /// No-op trace-level logging macro.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// No-op debug-level logging macro.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// No-op info-level logging macro.
    #[macro_export]
    macro_rules! info {
        ($($arg:tt)*) => {};
    }

    /// No-op warn-level logging macro.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }

    /// No-op error-level logging macro.
    #[macro_export]
    macro_rules! error {
        ($($arg:tt)*) => {};
    }

    // Re-export the macros at module level so call sites work on both
    // feature configurations.
    pub use crate::{debug, error, info, trace, warn};
}

#[cfg(not(feature = "tracing-integration"))]
pub use noop::*;
