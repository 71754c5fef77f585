//! Test utilities for Retrack.
//!
//! This module provides shared helpers for unit and conformance tests:
//! - Consistent tracing-based logging initialization
//! - A deterministic single-threaded task pump ([`DeterministicSpawner`])
//! - A manually-settled producer ([`ManualProducer`]) so tests control
//!   settlement order explicitly
//!
//! Everything here is deterministic: no timers, no threads, no real I/O.
//! A test issues invocations, settles them in whatever order the scenario
//! needs, and pumps the spawner until the queue stalls.
//!
//! # Example
//! ```
//! use retrack::test_utils::{init_test_logging, DeterministicSpawner, ManualProducer};
//! use retrack::{AsyncState, Controller, TriggerKey};
//!
//! init_test_logging();
//! let producer: ManualProducer<&str, &str> = ManualProducer::new();
//! let spawner = DeterministicSpawner::new();
//! let controller = Controller::new(producer.clone(), spawner.clone());
//!
//! controller.on_trigger_changed(TriggerKey::new(1));
//! producer.resolve(0, "data");
//! spawner.run_until_stalled();
//! assert_eq!(controller.snapshot(), AsyncState::Succeeded { data: "data" });
//! ```

use crate::controller::{Producer, ProducerFuture, Spawn, TaskFuture};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, Once};
use std::task::{Context, Poll, Wake, Waker};

static INIT_LOGGING: Once = Once::new();

/// Initialize test logging with trace-level output.
///
/// Safe to call multiple times; only initializes once.
pub fn init_test_logging() {
    init_test_logging_with_level(tracing::Level::TRACE);
}

/// Initialize test logging with a custom level.
///
/// The first call wins; later calls are no-ops.
pub fn init_test_logging_with_level(level: tracing::Level) {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_test_writer()
            .with_target(true)
            .with_ansi(false)
            .try_init();
    });
}

/// Waker that does nothing; the pump re-polls every queued task anyway.
struct NoopWake;

impl Wake for NoopWake {
    fn wake(self: Arc<Self>) {}
}

/// Single-threaded task queue with explicit, deterministic pumping.
///
/// Settlement tasks handed to [`Spawn::spawn`] are queued; nothing runs
/// until [`DeterministicSpawner::run_until_stalled`] polls the queue.
/// Clones share the queue.
#[derive(Clone, Default)]
pub struct DeterministicSpawner {
    tasks: Arc<Mutex<Vec<TaskFuture>>>,
}

impl DeterministicSpawner {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting in the queue.
    ///
    /// # Panics
    ///
    /// Panics if the queue mutex is poisoned.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.tasks.lock().expect("task queue poisoned").len()
    }

    /// Polls every queued task until a full pass completes none of them.
    ///
    /// Tasks that stay pending are kept, in order, ahead of anything
    /// spawned while polling. Returns the number of tasks that completed.
    ///
    /// # Panics
    ///
    /// Panics if the queue mutex is poisoned.
    pub fn run_until_stalled(&self) -> usize {
        let waker = Waker::from(Arc::new(NoopWake));
        let mut cx = Context::from_waker(&waker);
        let mut completed = 0;
        loop {
            let batch: Vec<TaskFuture> = {
                let mut queue = self.tasks.lock().expect("task queue poisoned");
                std::mem::take(&mut *queue)
            };
            if batch.is_empty() {
                break;
            }
            let mut still_pending = Vec::new();
            let mut progressed = false;
            for mut task in batch {
                match task.as_mut().poll(&mut cx) {
                    Poll::Ready(()) => {
                        completed += 1;
                        progressed = true;
                    }
                    Poll::Pending => still_pending.push(task),
                }
            }
            {
                let mut queue = self.tasks.lock().expect("task queue poisoned");
                still_pending.append(&mut queue);
                *queue = still_pending;
            }
            if !progressed {
                break;
            }
        }
        completed
    }
}

impl Spawn for DeterministicSpawner {
    fn spawn(&self, task: TaskFuture) {
        self.tasks.lock().expect("task queue poisoned").push(task);
    }
}

/// One recorded invocation of a [`ManualProducer`].
struct ManualCall<T, E> {
    is_rerun: bool,
    result: Option<Result<T, E>>,
    delivered: bool,
    waker: Option<Waker>,
}

struct ManualInner<T, E> {
    calls: Vec<ManualCall<T, E>>,
}

/// Producer whose invocations settle only when the test says so.
///
/// Each invocation gets an index in call order (starting at 0). The test
/// settles them individually with [`ManualProducer::resolve`] /
/// [`ManualProducer::reject`], in any order, which is how supersede
/// scenarios are driven. Clones share the call log.
pub struct ManualProducer<T, E> {
    inner: Arc<Mutex<ManualInner<T, E>>>,
}

impl<T, E> Clone for ManualProducer<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E> Default for ManualProducer<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> ManualProducer<T, E> {
    /// Creates a producer with no recorded invocations.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ManualInner { calls: Vec::new() })),
        }
    }

    /// Number of invocations issued so far.
    ///
    /// # Panics
    ///
    /// Panics if the call log mutex is poisoned.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.inner.lock().expect("call log poisoned").calls.len()
    }

    /// The `is_rerun` flag each invocation was started with, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the call log mutex is poisoned.
    #[must_use]
    pub fn rerun_flags(&self) -> Vec<bool> {
        self.inner
            .lock()
            .expect("call log poisoned")
            .calls
            .iter()
            .map(|call| call.is_rerun)
            .collect()
    }

    /// Settles invocation `index` with a success.
    ///
    /// # Panics
    ///
    /// Panics if the invocation does not exist or was already settled.
    pub fn resolve(&self, index: usize, value: T) {
        self.settle(index, Ok(value));
    }

    /// Settles invocation `index` with a rejection.
    ///
    /// # Panics
    ///
    /// Panics if the invocation does not exist or was already settled.
    pub fn reject(&self, index: usize, error: E) {
        self.settle(index, Err(error));
    }

    /// Settles invocation `index` with an explicit result.
    ///
    /// # Panics
    ///
    /// Panics if the invocation does not exist or was already settled.
    pub fn settle(&self, index: usize, result: Result<T, E>) {
        let mut inner = self.inner.lock().expect("call log poisoned");
        let call = inner
            .calls
            .get_mut(index)
            .unwrap_or_else(|| panic!("no invocation with index {index}"));
        assert!(
            call.result.is_none() && !call.delivered,
            "invocation {index} already settled"
        );
        call.result = Some(result);
        if let Some(waker) = call.waker.take() {
            waker.wake();
        }
    }
}

impl<T, E> Producer<T, E> for ManualProducer<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn produce(&self, is_rerun: bool) -> ProducerFuture<T, E> {
        let index = {
            let mut inner = self.inner.lock().expect("call log poisoned");
            inner.calls.push(ManualCall {
                is_rerun,
                result: None,
                delivered: false,
                waker: None,
            });
            inner.calls.len() - 1
        };
        Box::pin(ManualSettlement {
            inner: Arc::clone(&self.inner),
            index,
        })
    }
}

/// Future returned by [`ManualProducer::produce`]; resolves once the test
/// settles its invocation.
struct ManualSettlement<T, E> {
    inner: Arc<Mutex<ManualInner<T, E>>>,
    index: usize,
}

impl<T, E> Future for ManualSettlement<T, E> {
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut inner = self.inner.lock().expect("call log poisoned");
        let call = &mut inner.calls[self.index];
        if let Some(result) = call.result.take() {
            call.delivered = true;
            Poll::Ready(result)
        } else {
            call.waker = Some(cx.waker().clone());
            Poll::Pending
        }
    }
}
