//! # Queued units of work: callback, context, task.
//!
//! A [`Task`] is what the [`Dispatcher`](crate::Dispatcher) queues and runs:
//! an optional target [`Context`], a concrete [`Callback`] handle, and the
//! argument record the callback receives. Tasks are created at enqueue time
//! and destroyed after execution; they are never rescheduled.
//!
//! ## Identity semantics
//! [`Callback`] and [`Context`] are shared handles (`Rc`-backed). Cloning
//! shares the underlying function/object; equality compares handle identity,
//! not structure:
//!
//! ```rust
//! use prophub::Callback;
//!
//! let a = Callback::infallible(|_: &i32| {});
//! let b = a.clone();
//! let c = Callback::infallible(|_: &i32| {});
//!
//! assert_eq!(a, b);  // same handle
//! assert_ne!(a, c);  // independent handles, even with identical bodies
//! ```
//!
//! ## Rules
//! - **Concrete callables**: a task carries the function handle itself; there
//!   is no name-based method lookup at run time.
//! - **Opaque contexts**: [`Context`] is only an identity token plus a
//!   [`downcast_ref`](Context::downcast_ref) escape hatch for failure hooks.
//! - **Single ownership of the argument**: each task owns its argument record;
//!   callers needing several values pass a tuple.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::error::TaskError;

/// Shared handle to a subscriber/task function.
///
/// Wraps `Rc<dyn Fn(&A) -> Result<(), TaskError>>`. The wrapped function is
/// invoked by the dispatcher with a reference to the task's argument record.
///
/// ### Properties
/// - **Cheap to clone**: clones share the same underlying function.
/// - **Identity equality**: two callbacks compare equal iff they share the
///   same handle ([`Callback::ptr_eq`]); the hub relies on this for
///   idempotent subscription.
pub struct Callback<A>(Rc<dyn Fn(&A) -> Result<(), TaskError>>);

impl<A> Callback<A> {
    /// Wraps a fallible function.
    ///
    /// An `Err` returned by `f` is routed to the dispatcher's failure hook;
    /// it never aborts the drain pass it runs in.
    ///
    /// ## Example
    /// ```rust
    /// use prophub::{Callback, TaskError};
    ///
    /// let guard = Callback::new(|n: &i32| {
    ///     if *n < 0 {
    ///         return Err(TaskError::Fail { error: format!("negative: {n}") });
    ///     }
    ///     Ok(())
    /// });
    ///
    /// assert!(guard.call(&3).is_ok());
    /// assert!(guard.call(&-3).is_err());
    /// ```
    pub fn new<F>(f: F) -> Self
    where
        A: 'static,
        F: Fn(&A) -> Result<(), TaskError> + 'static,
    {
        Self(Rc::new(f))
    }

    /// Wraps an infallible function.
    ///
    /// Shorthand for closures with nothing to report; the wrapped function
    /// always succeeds (it can still panic, which the dispatcher isolates).
    pub fn infallible<F>(f: F) -> Self
    where
        A: 'static,
        F: Fn(&A) + 'static,
    {
        let wrapped = move |arg: &A| -> Result<(), TaskError> {
            f(arg);
            Ok(())
        };
        Self(Rc::new(wrapped))
    }

    /// Invokes the wrapped function directly, outside any queue.
    #[inline]
    pub fn call(&self, arg: &A) -> Result<(), TaskError> {
        (*self.0)(arg)
    }

    /// Returns `true` if both callbacks share the same underlying function.
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<A> Clone for Callback<A> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<A> PartialEq for Callback<A> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<A> Eq for Callback<A> {}

impl<A> fmt::Debug for Callback<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Rc::as_ptr(&self.0))
    }
}

/// Shared opaque handle standing in for a subscriber's context object.
///
/// The hub never looks inside a context; it is an identity discriminator for
/// subscriber deduplication and the `target` recorded on a task, so a failure
/// hook can tell on whose behalf a task ran.
///
/// ## Example
/// ```rust
/// use prophub::Context;
///
/// let ctx = Context::new(String::from("billing"));
/// assert_eq!(ctx.downcast_ref::<String>().map(String::as_str), Some("billing"));
/// assert!(ctx.downcast_ref::<i32>().is_none());
///
/// let same = ctx.clone();
/// assert!(ctx.ptr_eq(&same));
/// ```
#[derive(Clone)]
pub struct Context(Rc<dyn Any>);

impl Context {
    /// Wraps a value into a fresh context handle.
    pub fn new<T: Any>(value: T) -> Self {
        Self(Rc::new(value))
    }

    /// Wraps an already-shared value without reallocating.
    pub fn from_rc<T: Any>(value: Rc<T>) -> Self {
        Self(value)
    }

    /// Borrows the wrapped value if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Returns `true` if both contexts share the same underlying object.
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Context {}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Context({:p})", Rc::as_ptr(&self.0))
    }
}

/// A queued unit of deferred work.
///
/// Immutable once created: the dispatcher pops it, runs it once, and drops
/// it. Failed tasks are handed to the failure hook together with the error,
/// then discarded; there is no retry.
pub struct Task<A> {
    target: Option<Context>,
    callable: Callback<A>,
    arg: A,
}

impl<A> Task<A> {
    /// Creates a task from its three parts.
    pub fn new(target: Option<Context>, callable: Callback<A>, arg: A) -> Self {
        Self {
            target,
            callable,
            arg,
        }
    }

    /// The context this task runs on behalf of, if any.
    #[inline]
    pub fn target(&self) -> Option<&Context> {
        self.target.as_ref()
    }

    /// The function handle this task will invoke.
    #[inline]
    pub fn callable(&self) -> &Callback<A> {
        &self.callable
    }

    /// The argument record passed to the callable.
    #[inline]
    pub fn arg(&self) -> &A {
        &self.arg
    }

    /// Runs the callable against the argument record.
    ///
    /// Panic isolation lives in the dispatcher's drain loop, not here; a
    /// direct `run` propagates panics like any ordinary call.
    pub fn run(&self) -> Result<(), TaskError> {
        self.callable.call(&self.arg)
    }
}

impl<A: fmt::Debug> fmt::Debug for Task<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("target", &self.target)
            .field("callable", &self.callable)
            .field("arg", &self.arg)
            .finish()
    }
}
