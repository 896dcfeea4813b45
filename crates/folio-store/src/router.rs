use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

use tokio::sync::broadcast;

use crate::event::StoreEvent;

/// A broadcast channel receiver for store events.
pub type EventStream = broadcast::Receiver<StoreEvent>;

type Callback = dyn Fn(&StoreEvent) + Send + Sync;

/// A registered callback.
struct Observer {
    id: u64,
    active: AtomicBool,
    callback: Box<Callback>,
}

/// Fan-out of store events to callbacks and broadcast receivers.
pub(crate) struct EventRouter {
    observers: RwLock<Vec<Arc<Observer>>>,
    next_id: AtomicU64,
    channel: broadcast::Sender<StoreEvent>,
}

impl EventRouter {
    pub(crate) fn new(capacity: usize) -> Arc<Self> {
        let (channel, _) = broadcast::channel(capacity.max(1));
        Arc::new(Self {
            observers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            channel,
        })
    }

    pub(crate) fn subscribe<F>(self: &Arc<Self>, callback: F) -> Subscription
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let observer = Arc::new(Observer {
            id,
            active: AtomicBool::new(true),
            callback: Box::new(callback),
        });
        self.observers
            .write()
            .expect("router lock poisoned")
            .push(Arc::clone(&observer));
        Subscription {
            router: Arc::downgrade(self),
            observer: Some(observer),
        }
    }

    pub(crate) fn stream(&self) -> EventStream {
        self.channel.subscribe()
    }

    /// Deliver an event. Must be called with no store lock held, so callbacks
    /// may read from or write to the store.
    pub(crate) fn route(&self, event: &StoreEvent) {
        let snapshot: Vec<Arc<Observer>> = self
            .observers
            .read()
            .expect("router lock poisoned")
            .clone();
        for observer in snapshot {
            // An earlier callback in this pass may have released this one.
            if observer.active.load(Ordering::Acquire) {
                (observer.callback)(event);
            }
        }
        // No receivers is not an error.
        let _ = self.channel.send(event.clone());
    }

    pub(crate) fn observer_count(&self) -> usize {
        self.observers.read().expect("router lock poisoned").len()
    }

    fn release(&self, id: u64) {
        self.observers
            .write()
            .expect("router lock poisoned")
            .retain(|o| o.id != id);
    }
}

/// Handle for a registered store callback.
///
/// Dropping the handle unregisters the callback. Once the drop has returned,
/// the callback is never invoked again, including by a delivery pass that is
/// already in progress on the same thread.
#[must_use = "dropping a Subscription immediately unsubscribes"]
pub struct Subscription {
    router: Weak<EventRouter>,
    observer: Option<Arc<Observer>>,
}

impl Subscription {
    /// Explicitly unsubscribe. Equivalent to dropping the handle.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.active.store(false, Ordering::Release);
            if let Some(router) = self.router.upgrade() {
                router.release(observer.id);
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.observer.as_ref().map(|o| o.id))
            .finish()
    }
}
