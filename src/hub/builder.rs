//! # Construction-time hub configuration.
//!
//! [`HubBuilder`] collects the settings a [`Hub`] cannot change after
//! construction (queue capacity) together with the ones that are simply
//! convenient to set up front (failure hook, initial subscribers), then
//! assembles the hub in one step.

use std::fmt;
use std::hash::Hash;

use crate::dispatch::{Dispatcher, Task};
use crate::error::TaskError;

use super::hub::Hub;
use super::subscriber::Subscriber;

/// Builder for constructing a [`Hub`] with optional features.
///
/// ## Example
/// ```rust
/// use prophub::{Callback, Hub, Subscriber};
///
/// let hub: Hub<&str, i32> = Hub::builder()
///     .with_queue_capacity(32)
///     .with_failure_hook(|err, _task| eprintln!("delivery failed: {err}"))
///     .with_subscriber(
///         "temperature",
///         Subscriber::new(Callback::infallible(|t: &i32| println!("t={t}")), None),
///     )
///     .build();
///
/// hub.publish("temperature", 20);
/// assert_eq!(hub.get_last(&"temperature"), Some(20));
/// ```
pub struct HubBuilder<K, V> {
    queue_capacity: Option<usize>,
    failure_hook: Option<Box<dyn Fn(&TaskError, &Task<V>)>>,
    subscribers: Vec<(K, Subscriber<V>)>,
}

impl<K, V> HubBuilder<K, V> {
    /// Creates an empty builder; `build` on it equals `Hub::new`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue_capacity: None,
            failure_hook: None,
            subscribers: Vec::new(),
        }
    }

    /// Pre-allocates the dispatch queue for bursty publishes.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    /// Installs the dispatcher failure hook at construction.
    ///
    /// Equivalent to calling
    /// [`set_failure_hook`](crate::Dispatcher::set_failure_hook) on the
    /// built hub's dispatcher before anything is published.
    #[must_use]
    pub fn with_failure_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&TaskError, &Task<V>) + 'static,
    {
        self.failure_hook = Some(Box::new(hook));
        self
    }

    /// Registers a subscriber at build time.
    ///
    /// Deduplicated exactly like [`subscribe`](Hub::subscribe). No replay
    /// can occur here: a freshly built hub has no last values.
    #[must_use]
    pub fn with_subscriber(mut self, property: K, subscriber: Subscriber<V>) -> Self {
        self.subscribers.push((property, subscriber));
        self
    }
}

impl<K, V> HubBuilder<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Clone + 'static,
{
    /// Builds the hub and registers the collected subscribers.
    pub fn build(self) -> Hub<K, V> {
        let dispatcher = match self.queue_capacity {
            Some(capacity) => Dispatcher::with_capacity(capacity),
            None => Dispatcher::new(),
        };
        if let Some(hook) = self.failure_hook {
            dispatcher.set_failure_hook(hook);
        }

        let hub = Hub::with_dispatcher(dispatcher);
        for (property, subscriber) in self.subscribers {
            let (callback, context) = subscriber.into_parts();
            hub.subscribe(property, callback, context);
        }
        hub
    }
}

impl<K, V> Default for HubBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
