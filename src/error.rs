//! Error types used by the dispatch queue and subscriber callbacks.
//!
//! This module defines one error enum:
//!
//! - [`TaskError`] — errors raised by individual task executions.
//!
//! The type provides helper methods (`as_label`, `as_message`) for logging/metrics
//! and the [`TaskError::is_panic`] predicate.
//!
//! Failures never propagate to the code that published or enqueued: the
//! dispatcher catches them, hands them to its failure hook, and keeps
//! draining. See [`Dispatcher::set_failure_hook`](crate::Dispatcher::set_failure_hook).

use thiserror::Error;

/// # Errors produced by task execution.
///
/// These represent failures of individual queued callbacks. A failing task
/// never aborts the drain pass it runs in; the error is routed to the
/// dispatcher's failure hook and the queue continues.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Task callback returned an error.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task callback panicked; the panic was caught and converted.
    #[error("execution panicked: {message}")]
    Panicked {
        /// The panic payload, stringified.
        message: String,
    },
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use prophub::TaskError;
    ///
    /// let err = TaskError::Fail { error: "boom".into() };
    /// assert_eq!(err.as_label(), "task_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Panicked { .. } => "task_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Panicked { message } => format!("panic: {message}"),
        }
    }

    /// Indicates whether the error originated from a caught panic rather
    /// than an `Err` return.
    ///
    /// # Example
    /// ```
    /// use prophub::TaskError;
    ///
    /// let err = TaskError::Panicked { message: "oops".into() };
    /// assert!(err.is_panic()); // true
    ///
    /// let err = TaskError::Fail { error: "boom".into() };
    /// assert!(!err.is_panic()); // false
    /// ```
    pub fn is_panic(&self) -> bool {
        matches!(self, TaskError::Panicked { .. })
    }
}
