//! # prophub
//!
//! **Prophub** is an in-process publish/subscribe hub for Rust, built on a
//! serialized FIFO dispatch queue.
//!
//! Producers announce property value changes; subscribers register
//! callbacks that run, in controlled order, whenever the property changes;
//! late subscribers immediately receive the most recently published value.
//! Everything runs on one logical thread - reentrancy (callbacks that
//! publish, subscribe or drain while a pass is running) is the concurrency
//! model, not parallelism.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     publish(k, v)                subscribe(k, cb, ctx)
//!          │                              │
//!          ▼                              ▼
//! ┌──────────────────────────────────────────────────────┐
//! │ Hub<K, V>                                            │
//! │  subscribers: K → [Subscriber]   (insertion order)   │
//! │  last:        K → V              (replay cache)      │
//! └──────────────────┬───────────────────────────────────┘
//!                    │ enqueue(ctx, cb, v)  /  enter(ctx, cb, last[k])
//!                    ▼
//! ┌──────────────────────────────────────────────────────┐
//! │ Dispatcher<V>                                        │
//! │  queue: [ t1 │ t2 │ t3 │ ... ]   (FIFO, unbounded)   │
//! │  state: Idle | Draining          (reentrancy lock)   │
//! │  on_failure: FailureHook         (default: none)     │
//! └──────────────────┬───────────────────────────────────┘
//!                    ▼
//!             callback(&value)      one at a time, in order
//! ```
//!
//! ### Delivery lifecycle
//! ```text
//! hub.publish(k, v)
//!   ├─► last[k] = v
//!   ├─► for each subscriber of k: dispatcher.enqueue(task)
//!   └─► dispatcher.drain()
//!         │  already Draining? ──yes──► return (active pass picks it up)
//!         ▼ no: state = Draining
//!         loop: pop front task
//!           ├─► run callback(&v)
//!           │     ├─ Ok      ──► next task
//!           │     ├─ Err(e)  ──► failure hook(e, task) ──► next task
//!           │     └─ panic   ──► caught ──► hook(Panicked, task) ──► next
//!           └─► queue empty ──► state = Idle ──► return
//! ```
//!
//! Tasks enqueued while the loop runs (callbacks that publish or subscribe)
//! join the tail of the same pass: breadth order, never depth-first
//! recursion, and a nested `drain()` is always a no-op.
//!
//! ## Features
//! | Area                  | Description                                                  | Key types / traits                     |
//! |-----------------------|--------------------------------------------------------------|----------------------------------------|
//! | **Publish/subscribe** | Property-keyed fan-out with last-value replay.               | [`Hub`], [`Subscriber`]                |
//! | **Dispatch**          | Serialized FIFO queue with reentrancy guard.                 | [`Dispatcher`], [`Task`], [`DrainState`] |
//! | **Handles**           | Identity-compared callback/context handles.                  | [`Callback`], [`Context`]              |
//! | **Errors**            | Typed task failures routed to a configurable hook.           | [`TaskError`], [`FailureHook`]         |
//! | **Configuration**     | Construction-time setup (capacity, hook, subscribers).       | [`HubBuilder`]                         |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use prophub::Hub;
//!
//! fn main() {
//!     let hub: Hub<&str, f64> = Hub::new();
//!     let readings = Rc::new(RefCell::new(Vec::new()));
//!
//!     let sink = Rc::clone(&readings);
//!     hub.subscribe_fn("temperature", move |celsius: &f64| {
//!         sink.borrow_mut().push(*celsius);
//!     });
//!
//!     hub.publish("temperature", 21.5);
//!     hub.publish("temperature", 22.0);
//!
//!     // Late subscribers catch up from the last-value cache.
//!     let latest = Rc::new(RefCell::new(None));
//!     let sink = Rc::clone(&latest);
//!     hub.subscribe_fn("temperature", move |celsius: &f64| {
//!         *sink.borrow_mut() = Some(*celsius);
//!     });
//!
//!     assert_eq!(*readings.borrow(), vec![21.5, 22.0]);
//!     assert_eq!(*latest.borrow(), Some(22.0));
//! }
//! ```

mod dispatch;
mod error;
mod hub;

// ---- Public re-exports ----

pub use dispatch::{Callback, Context, DrainState, Dispatcher, FailureHook, Task};
pub use error::TaskError;
pub use hub::{Hub, HubBuilder, Subscriber};

// Optional: expose a simple built-in stdout watcher (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use hub::LogWriter;
