//! Generation-guarded lifecycle controller.
//!
//! A [`Controller`] owns exactly one logical slot of asynchronous work. It
//! decides when to start an invocation of the caller-supplied producer,
//! tags each started invocation with a monotonically increasing
//! [`Generation`], and commits a settlement into the observable
//! [`AsyncState`] only while two guards hold:
//!
//! 1. the captured generation is still the current one (the invocation has
//!    not been superseded by a newer start), and
//! 2. the owning context has not been torn down.
//!
//! Everything else — when dependencies count as changed, how the state is
//! rendered, what the producer actually does — belongs to the host. The
//! controller performs no I/O, owns no executor, and never blocks: started
//! settlement tasks are handed to the host through the [`Spawn`] seam.
//!
//! # Ordering guarantees
//!
//! - Commits are totally ordered by generation; a settlement whose captured
//!   generation is no longer current is dropped, even if it arrives first.
//! - Within one generation at most one commit occurs.
//! - No commit occurs after [`Controller::teardown`] returns; in-flight
//!   producers run to completion unobserved.
//!
//! Cancellation is cooperative and advisory: superseded or detached results
//! are discarded, the underlying future is not aborted.

use crate::activity::ActivityToken;
use crate::generation::Generation;
use crate::metrics::{ControllerMetrics, MetricsSnapshot};
use crate::state::AsyncState;
use crate::tracing_compat::{debug, error, trace};
use crate::trigger::TriggerKey;
use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future returned by a [`Producer`].
pub type ProducerFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'static>>;

/// Boxed settlement task handed to a [`Spawn`] implementation.
pub type TaskFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// The caller-supplied asynchronous operation.
///
/// `is_rerun` is true iff the invocation was requested through
/// [`Controller::rerun`] rather than by a trigger change or first
/// activation. The producer never receives a reference back into the
/// controller.
pub trait Producer<T, E>: Send + Sync {
    /// Starts one invocation.
    fn produce(&self, is_rerun: bool) -> ProducerFuture<T, E>;
}

impl<T, E, F> Producer<T, E> for F
where
    F: Fn(bool) -> ProducerFuture<T, E> + Send + Sync,
{
    fn produce(&self, is_rerun: bool) -> ProducerFuture<T, E> {
        (self)(is_rerun)
    }
}

/// Adapts a closure returning any `Send` future into a [`Producer`].
///
/// # Example
///
/// ```rust,ignore
/// let producer = producer_fn(|is_rerun| async move {
///     if is_rerun { fetch_fresh().await } else { fetch_cached().await }
/// });
/// ```
pub fn producer_fn<T, E, F, Fut>(f: F) -> impl Producer<T, E>
where
    F: Fn(bool) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    FnProducer(f)
}

struct FnProducer<F>(F);

impl<T, E, F, Fut> Producer<T, E> for FnProducer<F>
where
    F: Fn(bool) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    fn produce(&self, is_rerun: bool) -> ProducerFuture<T, E> {
        Box::pin((self.0)(is_rerun))
    }
}

/// The host seam that drives settlement tasks to completion.
///
/// The controller hands every started invocation to this seam as a boxed
/// task; the host decides where it runs (a runtime's `spawn`, a local
/// queue, a deterministic test pump).
pub trait Spawn: Send + Sync {
    /// Schedules one settlement task.
    fn spawn(&self, task: TaskFuture);
}

impl<F> Spawn for F
where
    F: Fn(TaskFuture) + Send + Sync,
{
    fn spawn(&self, task: TaskFuture) {
        (self)(task);
    }
}

/// What happened to one settlement at the commit gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommitOutcome {
    /// The settlement was written into the observable state.
    Committed,
    /// A newer invocation was issued; the result was dropped.
    Superseded,
    /// The context was torn down; the result was dropped.
    Detached,
}

/// Why an evaluation is running.
enum EvaluateCause {
    /// The binding layer reported a dependency-set change (or the first
    /// activation).
    Trigger(TriggerKey),
    /// An explicit rerun request.
    Rerun,
}

/// Mutable controller core. All starts and commits run under one lock, so
/// the generation guard is race-free even when the host settles on other
/// OS threads.
struct Core<T, E> {
    state: AsyncState<T, E>,
    generation: Generation,
    rerun_requests: u64,
    seen_reruns: u64,
    last_trigger: Option<TriggerKey>,
}

struct Shared<T, E> {
    core: Mutex<Core<T, E>>,
    activity: ActivityToken,
    metrics: ControllerMetrics,
    on_change: Option<Box<dyn Fn() + Send + Sync>>,
}

impl<T, E> Shared<T, E> {
    fn notify_change(&self) {
        if let Some(hook) = &self.on_change {
            hook();
        }
    }

    /// Applies one settlement iff the invocation is still the latest and
    /// the context is live.
    fn commit(&self, captured: Generation, result: Result<T, E>) -> CommitOutcome {
        let outcome = {
            let mut core = self.core.lock();
            if self.activity.is_torn_down() {
                CommitOutcome::Detached
            } else if core.generation != captured {
                CommitOutcome::Superseded
            } else {
                match result {
                    Ok(data) => {
                        core.state = AsyncState::Succeeded { data };
                        self.metrics.record_commit_succeeded();
                        debug!(generation = captured.as_u64(), "invocation resolved; success committed");
                    }
                    Err(error) => {
                        core.state = AsyncState::Failed { error };
                        self.metrics.record_commit_failed();
                        error!(generation = captured.as_u64(), "producer rejected; failure committed");
                    }
                }
                CommitOutcome::Committed
            }
        };
        match outcome {
            CommitOutcome::Committed => self.notify_change(),
            CommitOutcome::Superseded => {
                self.metrics.record_superseded();
                debug!(generation = captured.as_u64(), "settlement superseded; result dropped");
            }
            CommitOutcome::Detached => {
                self.metrics.record_discarded();
                trace!(generation = captured.as_u64(), "settlement after teardown; result dropped");
            }
        }
        outcome
    }
}

/// Lifecycle controller for one slot of asynchronous work.
///
/// Construct with [`Controller::builder`] (or [`Controller::new`] for the
/// common non-lazy case), then drive it from the binding layer:
/// [`Controller::on_trigger_changed`] on dependency changes and first
/// activation, [`Controller::rerun`] on explicit refresh requests,
/// [`Controller::teardown`] when the owning context is discarded.
/// Dropping the controller tears it down as well.
pub struct Controller<T, E> {
    shared: Arc<Shared<T, E>>,
    producer: Arc<dyn Producer<T, E>>,
    spawner: Arc<dyn Spawn>,
    lazy: bool,
}

impl<T, E> Controller<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Starts building a controller around `producer`.
    #[must_use]
    pub fn builder(producer: impl Producer<T, E> + 'static) -> ControllerBuilder<T, E> {
        ControllerBuilder {
            producer: Arc::new(producer),
            lazy: false,
            initial_state: None,
            on_change: None,
        }
    }

    /// Builds a non-lazy controller with default settings.
    #[must_use]
    pub fn new(
        producer: impl Producer<T, E> + 'static,
        spawner: impl Spawn + 'static,
    ) -> Self {
        Self::builder(producer).build(spawner)
    }

    /// Informs the controller that the binding layer's dependency set
    /// changed (or that the context was first activated).
    ///
    /// Non-lazy controllers start a new invocation; lazy controllers only
    /// record the key and stay put until [`Controller::rerun`].
    pub fn on_trigger_changed(&self, trigger: TriggerKey) {
        self.evaluate(EvaluateCause::Trigger(trigger));
    }

    /// Requests a fresh invocation.
    ///
    /// Safe to call repeatedly: each call issues a new generation, and only
    /// the last-issued invocation's settlement can commit. This is the one
    /// path that starts a lazy controller.
    pub fn rerun(&self) {
        self.evaluate(EvaluateCause::Rerun);
    }

    /// Tears the owning context down.
    ///
    /// Idempotent and absorbing: once this returns, no settlement commits,
    /// whatever its outcome. In-flight producers still run to completion.
    pub fn teardown(&self) {
        // The core lock serializes against in-progress commit decisions.
        let _guard = self.shared.core.lock();
        if self.shared.activity.tear_down() {
            debug!("context torn down; further settlements will be discarded");
        }
    }

    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn snapshot(&self) -> AsyncState<T, E>
    where
        T: Clone,
        E: Clone,
    {
        self.shared.core.lock().state.clone()
    }

    /// Reads the current state without cloning the payload.
    pub fn read<R>(&self, f: impl FnOnce(&AsyncState<T, E>) -> R) -> R {
        f(&self.shared.core.lock().state)
    }

    /// Returns the generation of the most recently authorized invocation.
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.shared.core.lock().generation
    }

    /// Returns the most recently recorded trigger key.
    #[must_use]
    pub fn last_trigger(&self) -> Option<TriggerKey> {
        self.shared.core.lock().last_trigger
    }

    /// Returns true once the context has been torn down.
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.shared.activity.is_torn_down()
    }

    /// Returns a point-in-time copy of the controller's counters.
    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    /// Runs one evaluation: decide whether to start, transition the
    /// observable state, and hand the settlement task to the spawner.
    fn evaluate(&self, cause: EvaluateCause) {
        if self.shared.activity.is_torn_down() {
            trace!("evaluation ignored; context torn down");
            return;
        }
        let launch = {
            let mut core = self.shared.core.lock();
            if matches!(cause, EvaluateCause::Rerun) {
                core.rerun_requests += 1;
                self.shared.metrics.record_rerun_request();
            }
            let is_rerun = match cause {
                EvaluateCause::Rerun => true,
                EvaluateCause::Trigger(_) => core.seen_reruns != core.rerun_requests,
            };
            core.seen_reruns = core.rerun_requests;
            if let EvaluateCause::Trigger(key) = cause {
                core.last_trigger = Some(key);
            }
            if self.lazy && !is_rerun {
                trace!(state = core.state.phase_name(), "lazy slot: trigger without rerun, not starting");
                None
            } else {
                // Fresh, fully-specified variant: a success keeps its
                // payload through Reloading, everything else drops to
                // Pending.
                let previous = std::mem::replace(&mut core.state, AsyncState::Pending);
                core.state = match previous {
                    AsyncState::Succeeded { data } => AsyncState::Reloading { data },
                    _ => AsyncState::Pending,
                };
                core.generation = core.generation.next();
                Some((is_rerun, core.generation))
            }
        };
        let Some((is_rerun, captured)) = launch else {
            return;
        };
        self.shared.metrics.record_started();
        self.shared.notify_change();
        debug!(generation = captured.as_u64(), is_rerun, "invocation started");
        let future = self.producer.produce(is_rerun);
        let shared = Arc::clone(&self.shared);
        self.spawner.spawn(Box::pin(async move {
            let result = future.await;
            shared.commit(captured, result);
        }));
    }
}

impl<T, E> Drop for Controller<T, E> {
    fn drop(&mut self) {
        let _guard = self.shared.core.lock();
        self.shared.activity.tear_down();
    }
}

/// Builder for [`Controller`].
pub struct ControllerBuilder<T, E> {
    producer: Arc<dyn Producer<T, E>>,
    lazy: bool,
    initial_state: Option<AsyncState<T, E>>,
    on_change: Option<Box<dyn Fn() + Send + Sync>>,
}

impl<T, E> ControllerBuilder<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Lazy controllers start in `Idle` and only ever invoke the producer
    /// through [`Controller::rerun`]. Default is false.
    #[must_use]
    pub fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    /// Seeds the observable state instead of the default (`Idle` when
    /// lazy, `Pending` otherwise).
    #[must_use]
    pub fn initial_state(mut self, state: AsyncState<T, E>) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Registers a hook invoked after every observable transition.
    ///
    /// The hook runs outside the controller lock and carries no payload;
    /// consumers re-read [`Controller::snapshot`]. This is the host's
    /// re-render signal.
    #[must_use]
    pub fn on_change(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_change = Some(Box::new(hook));
        self
    }

    /// Finishes construction. The producer is not invoked; the first
    /// trigger evaluation or rerun does that.
    #[must_use]
    pub fn build(self, spawner: impl Spawn + 'static) -> Controller<T, E> {
        let initial = self.initial_state.unwrap_or(if self.lazy {
            AsyncState::Idle
        } else {
            AsyncState::Pending
        });
        Controller {
            shared: Arc::new(Shared {
                core: Mutex::new(Core {
                    state: initial,
                    generation: Generation::GENESIS,
                    rerun_requests: 0,
                    seen_reruns: 0,
                    last_trigger: None,
                }),
                activity: ActivityToken::new(),
                metrics: ControllerMetrics::new(),
                on_change: self.on_change,
            }),
            producer: self.producer,
            spawner: Arc::new(spawner),
            lazy: self.lazy,
        }
    }
}
