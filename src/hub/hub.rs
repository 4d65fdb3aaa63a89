//! # Property pub/sub over the dispatch queue.
//!
//! [`Hub`] maps property keys to subscriber lists and to their last
//! published values, and routes every subscriber invocation through its
//! [`Dispatcher`]. It never calls a subscriber directly: publishing
//! enqueues one task per subscriber, then drains.
//!
//! ## Architecture
//! ```text
//! publish(k, v)
//!     │
//!     ├─ last[k] = v                     (committed before anything runs)
//!     ├─ for s in subscribers[k]:
//!     │      dispatcher.enqueue(s.context, s.callback, v)
//!     └─ dispatcher.drain()
//!
//! subscribe(k, cb, ctx)
//!     ├─ dedup by (cb, ctx) identity     (no-op when already registered)
//!     └─ last[k] exists? ──► dispatcher.enter(ctx, cb, last[k])
//!                            (replay through the queue, never inline)
//! ```
//!
//! ## Rules
//! - **Queue-only delivery**: callbacks run from drain passes, in FIFO
//!   order; a publish from inside a callback joins the active pass.
//! - **Late subscribers catch up**: a property's last value is replayed to
//!   each newly registered subscriber, exactly once, through the queue.
//! - **Presence, not truthiness**: "has a last value" means the key is
//!   present in the cache; a published `false`/zero/empty value is still a
//!   last value. The API renders this as `Option<V>`.
//! - **Borrow discipline**: no internal borrow is held while a callback
//!   runs, so callbacks may freely subscribe, unsubscribe and publish.
//!
//! ## Example
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use prophub::Hub;
//!
//! let hub: Hub<&str, u32> = Hub::new();
//! let seen = Rc::new(Cell::new(0));
//!
//! let sink = Rc::clone(&seen);
//! hub.subscribe_fn("temperature", move |t: &u32| sink.set(*t));
//!
//! hub.publish("temperature", 21);
//! assert_eq!(seen.get(), 21);
//! assert_eq!(hub.get_last(&"temperature"), Some(21));
//!
//! // A late subscriber is brought up to date immediately.
//! let late = Rc::new(Cell::new(0));
//! let sink = Rc::clone(&late);
//! hub.subscribe_fn("temperature", move |t: &u32| sink.set(*t));
//! assert_eq!(late.get(), 21);
//! ```

use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use tracing::debug;

use crate::dispatch::{Callback, Context, Dispatcher};

use super::builder::HubBuilder;
use super::subscriber::Subscriber;

/// In-process publish/subscribe hub with a last-value cache.
///
/// Generic over the property key `K` (any `Eq + Hash + Clone + Debug`
/// type, typically strings or enums) and a single payload type `V` per
/// hub; heterogeneous properties share a caller-chosen variant type.
///
/// Mutating methods take `&self` and return `&Self`, so calls compose
/// fluently. Handlers that call back into the hub capture an `Rc<Hub>`
/// (or a `Weak` to avoid cycles when the hub owns the handler's state
/// transitively).
///
/// ### Properties
/// - **Exclusive ownership**: the hub owns its subscriber lists, its
///   last-value cache and its [`Dispatcher`]; subscribers hold nothing back.
/// - **Infallible surface**: no operation returns an error; callback
///   failures are routed to the dispatcher's failure hook.
pub struct Hub<K, V> {
    subscribers: RefCell<HashMap<K, Vec<Subscriber<V>>>>,
    last: RefCell<HashMap<K, V>>,
    dispatcher: Dispatcher<V>,
}

impl<K, V> Hub<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Clone + 'static,
{
    /// Creates an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::with_dispatcher(Dispatcher::new())
    }

    /// Assembles a hub around a pre-configured dispatcher (builder path).
    pub(crate) fn with_dispatcher(dispatcher: Dispatcher<V>) -> Self {
        Self {
            subscribers: RefCell::new(HashMap::new()),
            last: RefCell::new(HashMap::new()),
            dispatcher,
        }
    }

    /// Starts building a hub with construction-time configuration.
    #[must_use]
    pub fn builder() -> HubBuilder<K, V> {
        HubBuilder::new()
    }

    /// Views the subscriber list for `property`, creating it empty on first
    /// access. The list persists for the hub's lifetime once created.
    ///
    /// ### Notes
    /// - The returned borrow must be dropped before calling any mutating
    ///   hub operation, or that call panics on the inner `RefCell`.
    pub fn subscribers_for(&self, property: &K) -> Ref<'_, [Subscriber<V>]> {
        {
            let mut map = self.subscribers.borrow_mut();
            if !map.contains_key(property) {
                map.insert(property.clone(), Vec::new());
            }
        }
        Ref::map(self.subscribers.borrow(), |map| {
            map.get(property).map(Vec::as_slice).unwrap_or(&[])
        })
    }

    /// Registers `(callback, context)` for changes to `property`.
    ///
    /// Idempotent: if an identical registration already exists (same
    /// callback handle, same context handle), the call does nothing.
    /// In particular it does not replay the last value a second time.
    ///
    /// If `property` already has a last value, the new subscriber is
    /// brought up to date with exactly one delivery of that value, routed
    /// through the queue like every other delivery. Inside an active drain
    /// pass the replay lands after the tasks already pending; it never runs
    /// inline within this call.
    pub fn subscribe(&self, property: K, callback: Callback<V>, context: Option<Context>) -> &Self {
        let subscriber = Subscriber::new(callback, context);
        {
            let mut map = self.subscribers.borrow_mut();
            let list = map.entry(property.clone()).or_default();
            if list.contains(&subscriber) {
                debug!(property = ?property, "subscribe ignored: identity already registered");
                return self;
            }
            list.push(subscriber.clone());
        }
        debug!(property = ?property, "subscribed");

        let replay = self.last.borrow().get(&property).cloned();
        if let Some(value) = replay {
            let (callback, context) = subscriber.into_parts();
            self.dispatcher.enter(context, callback, value);
        }
        self
    }

    /// Wraps an infallible closure, subscribes it with no context, and
    /// returns the callback handle.
    ///
    /// Keep the handle to unsubscribe later; a closure wrapped twice yields
    /// two distinct identities.
    pub fn subscribe_fn<F>(&self, property: K, f: F) -> Callback<V>
    where
        F: Fn(&V) + 'static,
    {
        let callback = Callback::infallible(f);
        self.subscribe(property, callback.clone(), None);
        callback
    }

    /// Removes every registration of `(callback, context)` from `property`.
    ///
    /// A no-op when nothing matches. Purely synchronous: deliveries already
    /// queued for this subscriber still run; only future publishes stop
    /// reaching it.
    pub fn unsubscribe(
        &self,
        property: &K,
        callback: &Callback<V>,
        context: Option<&Context>,
    ) -> &Self {
        let mut map = self.subscribers.borrow_mut();
        if let Some(list) = map.get_mut(property) {
            let before = list.len();
            list.retain(|sub| !sub.matches(callback, context));
            let removed = before - list.len();
            if removed > 0 {
                debug!(property = ?property, removed, "unsubscribed");
            }
        }
        self
    }

    /// Records `value` as the last value for `property` and enqueues one
    /// delivery per current subscriber, without draining.
    ///
    /// The subscriber list is snapshotted here: registrations and removals
    /// made while the queued deliveries later run do not affect this batch.
    pub fn dispatch(&self, property: K, value: V) -> &Self {
        self.last
            .borrow_mut()
            .insert(property.clone(), value.clone());
        let snapshot: Vec<Subscriber<V>> = self
            .subscribers
            .borrow()
            .get(&property)
            .cloned()
            .unwrap_or_default();
        debug!(property = ?property, subscribers = snapshot.len(), "dispatch");
        for sub in snapshot {
            let (callback, context) = sub.into_parts();
            self.dispatcher.enqueue(context, callback, value.clone());
        }
        self
    }

    /// Publishes `value` to every current subscriber of `property`.
    ///
    /// Equivalent to [`dispatch`](Hub::dispatch) followed by a drain.
    /// Synchronous from the caller's point of view: when it returns, the
    /// queue produced by this call (and transitively by the handlers it
    /// triggered) has been fully drained — unless a pass was already active
    /// higher up the stack, in which case this call's work merges into it.
    pub fn publish(&self, property: K, value: V) -> &Self {
        self.dispatch(property, value);
        self.dispatcher.drain();
        self
    }

    /// Publishes several properties as one batch, draining once.
    ///
    /// Every pair is dispatched (last value committed, deliveries
    /// enqueued) before the first callback runs, so a callback reading
    /// [`get_last`](Hub::get_last) for another property of the same batch
    /// sees the new value, never a stale one.
    ///
    /// Pairs are dispatched in the iterator's order; for unordered sources
    /// (e.g. a `HashMap`) the cross-property delivery order is arbitrary.
    pub fn publish_multiple<I>(&self, pairs: I) -> &Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (property, value) in pairs {
            self.dispatch(property, value);
        }
        self.dispatcher.drain();
        self
    }

    /// The last value published for `property`, if it was ever published.
    ///
    /// Pure lookup: never touches the queue. A published `false` (or any
    /// other "empty" value) is still `Some`.
    pub fn get_last(&self, property: &K) -> Option<V> {
        self.last.borrow().get(property).cloned()
    }

    /// Like [`get_last`](Hub::get_last), with an explicit default for
    /// never-published properties.
    pub fn get_last_or(&self, property: &K, default: V) -> V {
        self.get_last(property).unwrap_or(default)
    }

    /// The dispatcher all deliveries run through.
    ///
    /// Exposed for failure-hook installation and queue introspection.
    #[inline]
    pub fn dispatcher(&self) -> &Dispatcher<V> {
        &self.dispatcher
    }
}

impl<K, V> Default for Hub<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for Hub<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscribers = self.subscribers.borrow();
        let total: usize = subscribers.values().map(Vec::len).sum();
        f.debug_struct("Hub")
            .field("properties", &subscribers.len())
            .field("subscribers", &total)
            .field("cached", &self.last.borrow().len())
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use crate::error::TaskError;

    use super::*;

    fn counter() -> (Rc<Cell<u32>>, Callback<i32>) {
        let count = Rc::new(Cell::new(0));
        let sink = Rc::clone(&count);
        let cb = Callback::infallible(move |_: &i32| sink.set(sink.get() + 1));
        (count, cb)
    }

    #[test]
    fn test_publish_delivers_in_subscription_order() {
        let hub: Hub<&str, i32> = Hub::new();
        let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let sink = Rc::clone(&log);
            hub.subscribe_fn("x", move |v: &i32| {
                sink.borrow_mut().push(format!("{name}:{v}"));
            });
        }
        hub.publish("x", 7);

        assert_eq!(*log.borrow(), vec!["first:7", "second:7", "third:7"]);
    }

    #[test]
    fn test_subscribe_is_idempotent() {
        let hub: Hub<&str, i32> = Hub::new();
        let (count, cb) = counter();

        hub.subscribe("x", cb.clone(), None)
            .subscribe("x", cb.clone(), None);
        assert_eq!(hub.subscribers_for(&"x").len(), 1);

        hub.publish("x", 1);
        assert_eq!(count.get(), 1);

        // Re-registering the same identity after a publish must not replay.
        hub.subscribe("x", cb, None);
        assert_eq!(count.get(), 1);
        assert_eq!(hub.subscribers_for(&"x").len(), 1);
    }

    #[test]
    fn test_same_callback_under_different_contexts_registers_twice() {
        let hub: Hub<&str, i32> = Hub::new();
        let (count, cb) = counter();

        hub.subscribe("x", cb.clone(), Some(Context::new("a")));
        hub.subscribe("x", cb.clone(), Some(Context::new("b")));
        hub.subscribe("x", cb, None);
        assert_eq!(hub.subscribers_for(&"x").len(), 3);

        hub.publish("x", 1);
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn test_late_subscriber_receives_last_value_once() {
        let hub: Hub<&str, i32> = Hub::new();
        hub.publish("ready", 9);

        let seen: Rc<RefCell<Vec<i32>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        hub.subscribe_fn("ready", move |v: &i32| sink.borrow_mut().push(*v));

        assert_eq!(*seen.borrow(), vec![9]);
    }

    #[test]
    fn test_subscriber_to_unpublished_property_gets_nothing() {
        let hub: Hub<&str, i32> = Hub::new();
        let (count, cb) = counter();
        hub.subscribe("quiet", cb, None);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_replay_goes_through_the_queue_not_inline() {
        let hub: Rc<Hub<&'static str, i32>> = Rc::new(Hub::new());
        hub.publish("config", 1); // cache a value with no subscribers yet

        let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let h2 = Rc::clone(&hub);
        let sink = Rc::clone(&log);
        hub.subscribe_fn("trigger", move |_: &i32| {
            sink.borrow_mut().push("trigger:start".to_string());
            let replay_sink = Rc::clone(&sink);
            h2.subscribe_fn("config", move |v: &i32| {
                replay_sink.borrow_mut().push(format!("config={v}"));
            });
            sink.borrow_mut().push("trigger:end".to_string());
        });
        hub.publish("trigger", 0);

        // The replay queued behind the running task instead of running
        // inside subscribe_fn.
        assert_eq!(
            *log.borrow(),
            vec![
                "trigger:start".to_string(),
                "trigger:end".to_string(),
                "config=1".to_string(),
            ]
        );
    }

    #[test]
    fn test_get_last_distinguishes_false_from_missing() {
        let hub: Hub<&str, bool> = Hub::new();
        hub.publish("flag", false);

        assert_eq!(hub.get_last(&"flag"), Some(false));
        assert_eq!(hub.get_last(&"other"), None);
        assert!(hub.get_last_or(&"other", true));
        assert!(!hub.get_last_or(&"flag", true));
    }

    #[test]
    fn test_last_value_is_overwritten_by_each_publish() {
        let hub: Hub<&str, i32> = Hub::new();
        hub.publish("x", 1).publish("x", 2).dispatch("x", 3);
        assert_eq!(hub.get_last(&"x"), Some(3));
    }

    #[test]
    fn test_unsubscribe_stops_future_deliveries() {
        let hub: Hub<&str, i32> = Hub::new();
        let (count, cb) = counter();

        hub.subscribe("x", cb.clone(), None);
        hub.publish("x", 1);
        assert_eq!(count.get(), 1);

        hub.unsubscribe(&"x", &cb, None);
        hub.publish("x", 2);
        assert_eq!(count.get(), 1);
        assert!(hub.subscribers_for(&"x").is_empty());
    }

    #[test]
    fn test_unsubscribe_requires_matching_context() {
        let hub: Hub<&str, i32> = Hub::new();
        let (count, cb) = counter();
        let ctx = Context::new("owner");

        hub.subscribe("x", cb.clone(), Some(ctx.clone()));
        hub.unsubscribe(&"x", &cb, None); // wrong identity: no context
        hub.publish("x", 1);
        assert_eq!(count.get(), 1);

        hub.unsubscribe(&"x", &cb, Some(&ctx));
        hub.publish("x", 2);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_unsubscribe_of_unknown_identity_is_a_noop() {
        let hub: Hub<&str, i32> = Hub::new();
        let (_, stranger) = counter();
        hub.unsubscribe(&"ghost", &stranger, None); // nothing registered at all

        let (count, cb) = counter();
        hub.subscribe("x", cb, None);
        hub.unsubscribe(&"x", &stranger, None); // wrong callback
        hub.publish("x", 1);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_unsubscribe_does_not_retract_queued_deliveries() {
        let hub: Rc<Hub<&'static str, i32>> = Rc::new(Hub::new());
        let log: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));

        let b_sink = Rc::clone(&log);
        let b = Callback::infallible(move |_: &i32| b_sink.borrow_mut().push("b"));

        let h2 = Rc::clone(&hub);
        let a_sink = Rc::clone(&log);
        let b_handle = b.clone();
        hub.subscribe(
            "x",
            Callback::infallible(move |_: &i32| {
                a_sink.borrow_mut().push("a");
                h2.unsubscribe(&"x", &b_handle, None);
            }),
            None,
        );
        hub.subscribe("x", b, None);

        hub.publish("x", 1);
        // "b" was already enqueued when "a" removed it.
        assert_eq!(*log.borrow(), vec!["a", "b"]);

        hub.publish("x", 2);
        assert_eq!(*log.borrow(), vec!["a", "b", "a"]);
    }

    #[test]
    fn test_publish_from_inside_a_callback_joins_the_active_pass() {
        let hub: Rc<Hub<&'static str, i32>> = Rc::new(Hub::new());
        let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));

        let h2 = Rc::clone(&hub);
        let sink = Rc::clone(&log);
        hub.subscribe_fn("a", move |v: &i32| {
            sink.borrow_mut().push(format!("a={v}"));
            h2.publish("b", v * 10);
            sink.borrow_mut().push("a:done".to_string());
        });
        let sink = Rc::clone(&log);
        hub.subscribe_fn("b", move |v: &i32| {
            sink.borrow_mut().push(format!("b={v}"));
        });

        hub.publish("a", 1);

        // The nested publish only enqueued; its delivery ran after the
        // first callback returned, within the same outer pass.
        assert_eq!(
            *log.borrow(),
            vec![
                "a=1".to_string(),
                "a:done".to_string(),
                "b=10".to_string(),
            ]
        );
        assert!(!hub.dispatcher().is_draining());
        assert!(hub.dispatcher().is_empty());
    }

    #[test]
    fn test_publish_multiple_commits_all_last_values_before_callbacks() {
        let hub: Rc<Hub<&'static str, i32>> = Rc::new(Hub::new());
        let seen: Rc<RefCell<Vec<(i32, Option<i32>)>>> = Rc::new(RefCell::new(Vec::new()));

        let h2 = Rc::clone(&hub);
        let sink = Rc::clone(&seen);
        hub.subscribe_fn("a", move |v: &i32| {
            sink.borrow_mut().push((*v, h2.get_last(&"b")));
        });
        let h3 = Rc::clone(&hub);
        let sink = Rc::clone(&seen);
        hub.subscribe_fn("b", move |v: &i32| {
            sink.borrow_mut().push((*v, h3.get_last(&"a")));
        });

        hub.publish_multiple([("a", 1), ("b", 2)]);

        // Both callbacks observed both batch values, whichever ran first.
        assert_eq!(*seen.borrow(), vec![(1, Some(2)), (2, Some(1))]);
    }

    #[test]
    fn test_subscribers_for_lazily_creates_and_persists() {
        let hub: Hub<&str, i32> = Hub::new();
        assert!(hub.subscribers_for(&"metrics").is_empty());

        let cb = hub.subscribe_fn("metrics", |_: &i32| {});
        assert_eq!(hub.subscribers_for(&"metrics").len(), 1);

        hub.unsubscribe(&"metrics", &cb, None);
        // Emptied, not removed.
        assert!(hub.subscribers_for(&"metrics").is_empty());
    }

    #[test]
    fn test_subscribe_fn_handle_unsubscribes() {
        let hub: Hub<&str, i32> = Hub::new();
        let count = Rc::new(Cell::new(0u32));
        let sink = Rc::clone(&count);
        let handle = hub.subscribe_fn("x", move |_: &i32| sink.set(sink.get() + 1));

        hub.publish("x", 1);
        hub.unsubscribe(&"x", &handle, None);
        hub.publish("x", 2);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_failing_subscriber_reaches_hook_and_spares_the_rest() {
        let hub: Hub<&str, i32> = Hub::new();
        let errors: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&errors);
        hub.dispatcher()
            .set_failure_hook(move |err, _| sink.borrow_mut().push(err.as_message()));

        hub.subscribe(
            "x",
            Callback::new(|n: &i32| {
                Err(TaskError::Fail {
                    error: format!("cannot take {n}"),
                })
            }),
            None,
        );
        let (count, ok) = counter();
        hub.subscribe("x", ok, None);

        hub.publish("x", 5);

        assert_eq!(*errors.borrow(), vec!["error: cannot take 5".to_string()]);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_enum_keys_and_enum_payloads() {
        #[derive(Clone, Debug, PartialEq, Eq, Hash)]
        enum Channel {
            Temperature,
            Alarm,
        }
        #[derive(Clone, Debug, PartialEq)]
        enum Reading {
            Celsius(f64),
            Armed(bool),
        }

        let hub: Hub<Channel, Reading> = Hub::new();
        hub.publish(Channel::Temperature, Reading::Celsius(21.5));
        hub.publish(Channel::Alarm, Reading::Armed(true));

        assert_eq!(
            hub.get_last(&Channel::Temperature),
            Some(Reading::Celsius(21.5))
        );
        assert_eq!(hub.get_last(&Channel::Alarm), Some(Reading::Armed(true)));
    }

    #[test]
    fn test_debug_renders_counts() {
        let hub: Hub<&str, i32> = Hub::new();
        hub.subscribe_fn("x", |_: &i32| {});
        hub.publish("x", 1);

        let rendered = format!("{hub:?}");
        assert!(rendered.contains("properties: 1"));
        assert!(rendered.contains("subscribers: 1"));
        assert!(rendered.contains("cached: 1"));
    }
}
