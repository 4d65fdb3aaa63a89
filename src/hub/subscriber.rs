//! # Subscriber identity.
//!
//! A [`Subscriber`] is the (callback, optional context) pair a hub stores
//! per property. Identity is structural over the two handles: two values
//! built from the same [`Callback`] and the same [`Context`] compare equal
//! regardless of when or where they were constructed, which is what makes
//! [`subscribe`](crate::Hub::subscribe) idempotent and
//! [`unsubscribe`](crate::Hub::unsubscribe) work from a rebuilt pair.
//!
//! There is no canonical-instance table behind this: equality is computed
//! on demand from the handles, and holds no process-wide state.

use std::fmt;

use crate::dispatch::{Callback, Context};
use crate::error::TaskError;

/// A (callback, optional context) registration against a property.
///
/// ### Properties
/// - **Value object**: cloning copies the two handles; clones are
///   interchangeable with the original for subscribe/unsubscribe purposes.
/// - **Structural equality**: equal iff the callback handles are identical
///   and the context handles are identical (both absent counts as identical).
pub struct Subscriber<A> {
    callback: Callback<A>,
    context: Option<Context>,
}

impl<A> Subscriber<A> {
    /// Creates a subscriber identity from its two parts.
    pub fn new(callback: Callback<A>, context: Option<Context>) -> Self {
        Self { callback, context }
    }

    /// The callback invoked for each published value.
    #[inline]
    pub fn callback(&self) -> &Callback<A> {
        &self.callback
    }

    /// The context this subscription was registered under, if any.
    #[inline]
    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    /// Splits the subscriber back into its parts.
    pub fn into_parts(self) -> (Callback<A>, Option<Context>) {
        (self.callback, self.context)
    }

    /// Invokes the callback directly, outside any queue.
    ///
    /// Hub deliveries never use this path; they go through the dispatcher.
    pub fn call(&self, value: &A) -> Result<(), TaskError> {
        self.callback.call(value)
    }

    /// Returns `true` if this subscriber was registered with exactly this
    /// callback handle and context handle.
    pub fn matches(&self, callback: &Callback<A>, context: Option<&Context>) -> bool {
        if !self.callback.ptr_eq(callback) {
            return false;
        }
        match (self.context.as_ref(), context) {
            (None, None) => true,
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl<A> Clone for Subscriber<A> {
    fn clone(&self) -> Self {
        Self {
            callback: self.callback.clone(),
            context: self.context.clone(),
        }
    }
}

impl<A> PartialEq for Subscriber<A> {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.callback, other.context.as_ref())
    }
}

impl<A> Eq for Subscriber<A> {}

impl<A> fmt::Debug for Subscriber<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("callback", &self.callback)
            .field("context", &self.context)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_equal_parts_compare_equal_both_ways() {
        let cb: Callback<i32> = Callback::infallible(|_| {});
        let ctx = Context::new("owner");

        let a = Subscriber::new(cb.clone(), Some(ctx.clone()));
        let b = Subscriber::new(cb, Some(ctx));

        assert_eq!(a, b);
        assert_eq!(b, a);
    }

    #[test]
    fn test_differing_callback_or_context_compare_unequal() {
        let cb1: Callback<i32> = Callback::infallible(|_| {});
        let cb2: Callback<i32> = Callback::infallible(|_| {});
        let ctx1 = Context::new(1u8);
        let ctx2 = Context::new(1u8);

        let base = Subscriber::new(cb1.clone(), Some(ctx1.clone()));
        assert_ne!(base, Subscriber::new(cb2, Some(ctx1.clone())));
        assert_ne!(base, Subscriber::new(cb1.clone(), Some(ctx2)));
        assert_ne!(base, Subscriber::new(cb1, None));
    }

    #[test]
    fn test_absent_contexts_count_as_identical() {
        let cb: Callback<i32> = Callback::infallible(|_| {});
        assert_eq!(
            Subscriber::new(cb.clone(), None),
            Subscriber::new(cb, None)
        );
    }

    #[test]
    fn test_clone_is_interchangeable_with_original() {
        let cb: Callback<i32> = Callback::infallible(|_| {});
        let original = Subscriber::new(cb, Some(Context::new("ctx")));
        let clone = original.clone();

        assert_eq!(original, clone);
        assert!(clone.matches(original.callback(), original.context()));
    }

    #[test]
    fn test_call_invokes_the_callback() {
        let hits = Rc::new(Cell::new(0u32));
        let sink = Rc::clone(&hits);
        let sub = Subscriber::new(
            Callback::infallible(move |n: &u32| sink.set(sink.get() + n)),
            None,
        );

        sub.call(&2).unwrap();
        sub.call(&3).unwrap();
        assert_eq!(hits.get(), 5);
    }
}
