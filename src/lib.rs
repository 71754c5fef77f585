//! Retrack: generation-guarded lifecycle tracking for asynchronous operations.
//!
//! # Overview
//!
//! Retrack wraps one logical slot of asynchronous work — a caller-supplied
//! producer returning a future — and exposes its progress as a single
//! explicit [`AsyncState`] value instead of a handful of booleans that can
//! contradict each other. Superseded and post-teardown results are
//! discarded structurally, not by convention: every started invocation
//! carries a generation ticket, and a settlement commits only while its
//! ticket is still current and the owning context is live.
//!
//! # Core Guarantees
//!
//! - **One consistent state**: exactly one of idle / pending / succeeded /
//!   reloading / failed at any observed instant; no mixed states
//! - **Latest-issued wins**: a slow stale response never clobbers a fresher
//!   invocation, regardless of settlement order
//! - **Teardown is absorbing**: once the context is torn down, no commit is
//!   ever observed again; in-flight producers run to completion unobserved
//! - **Stale-data continuity**: re-invoking a succeeded slot moves through
//!   `Reloading`, keeping the previous payload for display; a failed slot
//!   re-invokes through `Pending` and holds nothing
//!
//! # Module Structure
//!
//! - [`state`]: The five-valued [`AsyncState`] and its query helpers
//! - [`controller`]: The lifecycle [`Controller`], its builder, and the
//!   [`Producer`]/[`Spawn`] seams to the host
//! - [`generation`]: Monotonic invocation tickets
//! - [`activity`]: The single-writer context liveness flag
//! - [`trigger`]: Opaque dependency-set keys from the binding layer
//! - [`metrics`]: Diagnostic counters per controller
//! - [`tracing_compat`]: Feature-gated structured logging shim
//!
//! # Example
//!
//! ```ignore
//! use retrack::{producer_fn, Controller, TriggerKey};
//!
//! // The host supplies the spawner; any `Fn(TaskFuture)` works.
//! let controller = Controller::builder(producer_fn(|is_rerun| async move {
//!     fetch_profile(is_rerun).await
//! }))
//! .on_change(|| request_redraw())
//! .build(|task| { runtime.spawn(task); });
//!
//! controller.on_trigger_changed(TriggerKey::of(&user_id)); // first activation
//! // ... later, the user hits refresh:
//! controller.rerun();
//! // ... the view reads:
//! let state = controller.snapshot();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod activity;
pub mod controller;
pub mod generation;
pub mod metrics;
pub mod state;
#[cfg(any(test, feature = "test-util"))]
pub mod test_utils;
pub mod tracing_compat;
pub mod trigger;

// Re-exports for convenient access to core types
pub use activity::ActivityToken;
pub use controller::{
    producer_fn, Controller, ControllerBuilder, Producer, ProducerFuture, Spawn, TaskFuture,
};
pub use generation::Generation;
pub use metrics::{ControllerMetrics, MetricsSnapshot};
pub use state::{AsyncState, StateError};
pub use trigger::TriggerKey;
