//! # Serialized FIFO task dispatch.
//!
//! [`Dispatcher`] owns an ordered queue of [`Task`]s and a reentrancy guard,
//! and executes queued tasks one at a time, strictly in enqueue order.
//!
//! ## Architecture
//! ```text
//! enqueue(target, callable, arg)
//!     │ push_back
//!     ▼
//! ┌────┬────┬────┬─────────────────┐
//! │ t1 │ t2 │ t3 │ ...             │  queue (FIFO, unbounded)
//! └────┴────┴────┴─────────────────┘
//!     │ pop_front                     drain(): Idle ──► Draining
//!     ▼
//!   run(t) ──ok──────────────────► next task
//!     │
//!     └─Err / panic ──► failure hook ──► next task (pass never aborts)
//! ```
//!
//! ## Rules
//! - **FIFO**: tasks run in enqueue order; tasks enqueued *during* a drain
//!   join the tail of the same pass (breadth order, not depth-first).
//! - **Reentrancy**: `drain()` while already draining is a pure no-op; the
//!   active pass services everything, a nested call never runs tasks.
//! - **Isolation**: a task failing with `Err` or a panic is reported to the
//!   failure hook and the pass continues.
//! - **Single-threaded**: interior mutability via `RefCell`/`Cell`; the type
//!   is not `Send`/`Sync`. Reentrancy comes from callbacks calling back in,
//!   not from threads.
//!
//! ## Example
//! ```rust
//! use prophub::{Callback, Dispatcher};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let dispatcher: Dispatcher<u32> = Dispatcher::new();
//! let log = Rc::new(RefCell::new(Vec::new()));
//!
//! let sink = Rc::clone(&log);
//! let record = Callback::infallible(move |n: &u32| sink.borrow_mut().push(*n));
//!
//! dispatcher
//!     .enqueue(None, record.clone(), 1)
//!     .enqueue(None, record, 2)
//!     .drain();
//!
//! assert_eq!(*log.borrow(), vec![1, 2]);
//! ```

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::error::TaskError;

use super::task::{Callback, Context, Task};

/// Hook invoked when a queued task fails.
///
/// Receives the error and the failed task (whose [`Task::target`] identifies
/// the subscriber context it ran for). Installed via
/// [`Dispatcher::set_failure_hook`]; absent by default.
pub type FailureHook<A> = Rc<dyn Fn(&TaskError, &Task<A>)>;

/// Drain-loop state of a [`Dispatcher`].
///
/// At most one logical invocation may run the drain loop at a time; the
/// state is the reentrancy lock that enforces it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DrainState {
    /// No drain pass is running.
    #[default]
    Idle,
    /// A drain pass is running; nested drain requests are no-ops.
    Draining,
}

/// Serialized FIFO task queue with reentrancy guard.
///
/// All methods take `&self`; tasks are expected to call back into the
/// dispatcher while they run (enqueueing more work, requesting drains),
/// so the queue, state and hook live behind interior mutability. No
/// borrow is held while a task executes.
///
/// ### Properties
/// - **Non-blocking enqueue**: `enqueue` appends and returns; nothing runs.
/// - **Run-to-completion**: a dequeued task always finishes (or fails);
///   there is no cancellation.
/// - **Guaranteed unlock**: the state returns to [`DrainState::Idle`] after
///   every pass, even if a task or the hook itself panics.
pub struct Dispatcher<A> {
    queue: RefCell<VecDeque<Task<A>>>,
    state: Cell<DrainState>,
    on_failure: RefCell<Option<FailureHook<A>>>,
}

impl<A: 'static> Dispatcher<A> {
    /// Creates an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: RefCell::new(VecDeque::new()),
            state: Cell::new(DrainState::Idle),
            on_failure: RefCell::new(None),
        }
    }

    /// Creates an empty dispatcher with pre-allocated queue capacity.
    ///
    /// Purely an allocation hint for bursty publishes; behavior is identical
    /// to [`Dispatcher::new`].
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: RefCell::new(VecDeque::with_capacity(capacity)),
            state: Cell::new(DrainState::Idle),
            on_failure: RefCell::new(None),
        }
    }

    /// Appends a task to the tail of the queue.
    ///
    /// Never runs anything and never fails; the task waits for the next
    /// (or the currently active) drain pass.
    pub fn enqueue(&self, target: Option<Context>, callable: Callback<A>, arg: A) -> &Self {
        let depth = {
            let mut queue = self.queue.borrow_mut();
            queue.push_back(Task::new(target, callable, arg));
            queue.len()
        };
        trace!(depth, "task enqueued");
        self
    }

    /// Runs queued tasks in FIFO order until the queue is empty.
    ///
    /// Tasks enqueued while the pass runs (by the tasks themselves) join
    /// the tail of the same pass. A failing task is reported to the failure
    /// hook and the pass continues with the next task.
    ///
    /// ### Reentrancy
    /// If a pass is already active, this call is a no-op: the queued work
    /// stays queued and is serviced by the active pass. Only the invocation
    /// that started a pass releases the `Draining` state.
    pub fn drain(&self) -> &Self {
        if self.state.replace(DrainState::Draining) == DrainState::Draining {
            trace!("drain skipped: pass already active");
            return self;
        }
        // Restores Idle on scope exit, panicking hooks included.
        let _guard = DrainGuard { state: &self.state };

        debug!(pending = self.queue.borrow().len(), "drain started");
        let mut executed = 0usize;
        loop {
            let task = self.queue.borrow_mut().pop_front();
            let Some(task) = task else { break };
            executed += 1;

            let outcome = catch_unwind(AssertUnwindSafe(|| task.run()));
            let failure = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(err)) => Some(err),
                Err(payload) => Some(TaskError::Panicked {
                    message: panic_message(payload.as_ref()),
                }),
            };

            if let Some(err) = failure {
                warn!(error = %err, label = err.as_label(), "task failed during drain");
                let hook = self.on_failure.borrow().clone();
                if let Some(hook) = hook {
                    (*hook)(&err, &task);
                }
            }
        }
        debug!(executed, "drain finished");
        self
    }

    /// Appends a task and immediately requests a drain.
    ///
    /// The primary way new work both joins the queue and attempts to make
    /// progress. Whether anything runs right away depends on whether a pass
    /// is already active: inside one, the task simply queues behind the
    /// pending tail.
    pub fn enter(&self, target: Option<Context>, callable: Callback<A>, arg: A) -> &Self {
        self.enqueue(target, callable, arg).drain()
    }

    /// Installs the failure hook, replacing any previous one.
    ///
    /// Safe to call from within a running task: the active pass picks up
    /// the new hook for subsequent failures.
    pub fn set_failure_hook<F>(&self, hook: F) -> &Self
    where
        F: Fn(&TaskError, &Task<A>) + 'static,
    {
        *self.on_failure.borrow_mut() = Some(Rc::new(hook));
        self
    }

    /// Removes the failure hook; subsequent failures are logged and ignored.
    pub fn clear_failure_hook(&self) -> &Self {
        *self.on_failure.borrow_mut() = None;
        self
    }

    /// Number of tasks currently queued.
    #[inline]
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Returns `true` if no tasks are queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Current drain-loop state.
    #[inline]
    pub fn state(&self) -> DrainState {
        self.state.get()
    }

    /// Returns `true` while a drain pass is active.
    #[inline]
    pub fn is_draining(&self) -> bool {
        self.state.get() == DrainState::Draining
    }
}

impl<A: 'static> Default for Dispatcher<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for Dispatcher<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("queued", &self.queue.borrow().len())
            .field("state", &self.state.get())
            .finish()
    }
}

/// Releases the drain lock when the pass ends, however it ends.
struct DrainGuard<'a> {
    state: &'a Cell<DrainState>,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.state.set(DrainState::Idle);
    }
}

/// Renders a caught panic payload in a loggable form.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
