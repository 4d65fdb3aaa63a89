//! # Serialized task dispatch for single-threaded reentrant code.
//!
//! This module provides the queueing half of the crate: [`Dispatcher`]
//! executes [`Task`]s one at a time in FIFO order, and the
//! [`Hub`](crate::Hub) routes every subscriber invocation through it.
//!
//! ## Architecture
//! ```text
//! caller / running task
//!     │ enqueue(target, callable, arg)        ┌─ Callback (shared fn handle)
//!     ▼                                       ├─ Context  (identity token)
//! ┌──────────────────────────────┐            └─ arg      (owned record)
//! │ Dispatcher                   │
//! │  queue: [ t1 │ t2 │ ... ]    │  drain(): pop-front, run, repeat
//! │  state: Idle | Draining      │  nested drain() → no-op
//! │  on_failure: hook            │  Err/panic → hook, pass continues
//! └──────────────────────────────┘
//! ```
//!
//! ## Rules
//! - **One consumer**: at most one drain pass runs at a time; the
//!   [`DrainState`] flag is the reentrancy lock.
//! - **Breadth order**: work enqueued by a running task lands at the tail
//!   of the active pass, after everything already queued.
//! - **Failures stay local**: a task failure reaches the [`FailureHook`]
//!   and nothing else; `drain()` itself is infallible.

mod dispatcher;
mod task;

pub use dispatcher::{DrainState, Dispatcher, FailureHook};
pub use task::{Callback, Context, Task};
