//! # Simple stdout watcher for debugging and demos.
//!
//! [`LogWriter`] prints published values and task failures to stdout in a
//! human-readable format. This is primarily useful for development,
//! debugging, and the example programs.
//!
//! ## Output format
//! ```text
//! ["temperature"] value=21.5
//! ["temperature"] value=22.0
//! [failure] label=task_failed err=Fail { error: "sensor offline" } arg=3
//! ```

use std::fmt;
use std::hash::Hash;

use crate::dispatch::{Callback, Task};
use crate::error::TaskError;

use super::hub::Hub;

/// Simple stdout watcher.
///
/// Enabled via the `logging` feature. Prints human-readable lines for
/// debugging and demonstration purposes.
///
/// Not intended for production use - install your own subscribers and
/// route the failure hook into your logging/telemetry instead.
pub struct LogWriter;

impl LogWriter {
    /// Subscribes a printing callback to `property` and returns its handle.
    ///
    /// Each published value (including the replayed last value, if any)
    /// prints as `[<property>] value=<value>`.
    pub fn watch<K, V>(hub: &Hub<K, V>, property: K) -> Callback<V>
    where
        K: Eq + Hash + Clone + fmt::Debug,
        V: Clone + fmt::Debug + 'static,
    {
        let label = format!("{property:?}");
        let callback = Callback::infallible(move |value: &V| {
            println!("[{label}] value={value:?}");
        });
        hub.subscribe(property, callback.clone(), None);
        callback
    }

    /// A ready-made failure hook that prints each failed delivery.
    pub fn failure_hook<A>() -> impl Fn(&TaskError, &Task<A>)
    where
        A: fmt::Debug + 'static,
    {
        |err: &TaskError, task: &Task<A>| {
            println!(
                "[failure] label={} err={:?} arg={:?}",
                err.as_label(),
                err,
                task.arg()
            );
        }
    }
}
