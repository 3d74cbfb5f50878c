//! Event Bus for publishing lobby events to the UI.
//!
//! The EventBus is a typed observer registry: subscribers register a callback
//! (or ask for a channel) and get back a [`Subscription`]. Dropping the
//! subscription unregisters the subscriber. Posting never waits for
//! subscribers to finish and never fails.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::mpsc;

enum Subscriber<E> {
    Callback(Arc<dyn Fn(E) + Send + Sync + 'static>),
    Channel(mpsc::UnboundedSender<E>),
}

impl<E> Clone for Subscriber<E> {
    fn clone(&self) -> Self {
        match self {
            Subscriber::Callback(callback) => Subscriber::Callback(Arc::clone(callback)),
            Subscriber::Channel(tx) => Subscriber::Channel(tx.clone()),
        }
    }
}

impl<E> Subscriber<E> {
    /// Deliver one event. Returns false once the subscriber is gone for good.
    fn deliver(&self, event: E) -> bool {
        match self {
            Subscriber::Callback(callback) => {
                callback(event);
                true
            }
            Subscriber::Channel(tx) => tx.send(event).is_ok(),
        }
    }
}

struct Registry<E> {
    next_id: u64,
    subscribers: Vec<(u64, Subscriber<E>)>,
}

impl<E> Registry<E> {
    fn remove(&mut self, id: u64) {
        self.subscribers.retain(|(subscriber_id, _)| *subscriber_id != id);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Callbacks run outside the lock, so poisoning only follows a panic in here.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Event bus for one event type.
///
/// Cloning the bus yields another handle to the same registry.
pub struct EventBus<E> {
    registry: Arc<Mutex<Registry<E>>>,
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<E: Clone + Send + 'static> EventBus<E> {
    /// Create a new EventBus with no subscribers.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Subscribe to all events.
    ///
    /// The callback runs on the thread that posts the event. It may post to or
    /// subscribe on this bus.
    pub fn subscribe(&self, callback: impl Fn(E) + Send + Sync + 'static) -> Subscription {
        self.register(Subscriber::Callback(Arc::new(callback)))
    }

    /// Subscribe to all events through an unbounded channel.
    pub fn subscribe_channel(&self) -> (Subscription, mpsc::UnboundedReceiver<E>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (self.register(Subscriber::Channel(tx)), rx)
    }

    /// Deliver an event to every current subscriber.
    pub fn post(&self, event: E) {
        let subscribers: Vec<_> = lock(&self.registry)
            .subscribers
            .iter()
            .map(|(id, subscriber)| (*id, subscriber.clone()))
            .collect();

        let mut gone = Vec::new();
        for (id, subscriber) in subscribers {
            if !subscriber.deliver(event.clone()) {
                gone.push(id);
            }
        }

        if !gone.is_empty() {
            let mut registry = lock(&self.registry);
            for id in gone {
                tracing::debug!(subscriber_id = id, "Dropping subscriber with closed channel");
                registry.remove(id);
            }
        }
    }

    /// Get the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        lock(&self.registry).subscribers.len()
    }

    fn register(&self, subscriber: Subscriber<E>) -> Subscription {
        let id = {
            let mut registry = lock(&self.registry);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.subscribers.push((id, subscriber));
            id
        };

        let registry: Weak<Mutex<Registry<E>>> = Arc::downgrade(&self.registry);
        Subscription {
            unregister: Some(Box::new(move || {
                if let Some(registry) = registry.upgrade() {
                    lock(&registry).remove(id);
                }
            })),
        }
    }
}

impl<E: Clone + Send + 'static> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps a subscriber registered. Dropping it unregisters the subscriber.
#[must_use = "dropping a Subscription unregisters the subscriber immediately"]
pub struct Subscription {
    unregister: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Unregister now instead of on drop.
    pub fn cancel(mut self) {
        if let Some(unregister) = self.unregister.take() {
            unregister();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unregister) = self.unregister.take() {
            unregister();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unregister.is_some())
            .finish()
    }
}
