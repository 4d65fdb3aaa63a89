//! # Property publish/subscribe layer.
//!
//! This module provides the pub/sub half of the crate, built on the
//! [`Dispatcher`](crate::Dispatcher): [`Hub`] keeps per-property
//! subscriber lists and a last-value cache, and routes every delivery
//! through its dispatcher.
//!
//! ## Architecture
//! ```text
//! producer ── publish(k, v) ──► Hub
//!                                ├─ last[k] = v
//!                                ├─ enqueue one task per Subscriber of k
//!                                └─ drain (FIFO, merged into any active pass)
//!
//! late subscriber ── subscribe(k, cb, ctx) ──► Hub
//!                                ├─ dedup by (cb, ctx) handle identity
//!                                └─ replay last[k] through the queue
//! ```
//!
//! ## Subscriber identity
//! A [`Subscriber`] is the (callback, optional context) pair; equality is
//! handle identity on both parts, computed on demand. Registering the same
//! pair twice is a no-op; unsubscribing rebuilds the pair from the caller's
//! kept handles.

mod builder;
mod hub;
mod subscriber;

pub use builder::HubBuilder;
pub use hub::Hub;
pub use subscriber::Subscriber;

#[cfg(feature = "logging")]
mod log;
#[cfg(feature = "logging")]
pub use log::LogWriter;
