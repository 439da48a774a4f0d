use super::types::{Event, EventKind};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;
use tracing::trace;

/// Callback invoked for every matching event.
///
/// Callbacks are compared by pointer identity, so unsubscribing requires the
/// same `Arc` that was subscribed.
pub type EventCallback = Arc<dyn Fn(&Event) + Send + Sync>;

/// Host-side subscription interface.
pub trait EventSource: Send + Sync {
    /// Register `callback` for each of `kinds`. Registering the same callback
    /// twice for a kind has no effect.
    fn subscribe(&self, kinds: &[EventKind], callback: EventCallback);

    /// Remove `callback` from each of `kinds`.
    fn unsubscribe(&self, kinds: &[EventKind], callback: &EventCallback);
}

fn same_callback(a: &EventCallback, b: &EventCallback) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

struct Registration {
    kind: EventKind,
    callback: EventCallback,
}

/// In-process event bus.
///
/// `publish` runs matching callbacks synchronously on the caller's thread,
/// then broadcasts the event to observers. Slow observers miss events
/// (lagged) rather than blocking the publisher.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
    registrations: Arc<RwLock<Vec<Registration>>>,
}

impl EventBus {
    /// Create a new EventBus with the given observer channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            registrations: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Observe every published event.
    #[must_use]
    pub fn observe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Publish an event.
    ///
    /// Returns the number of callbacks invoked.
    pub fn publish(&self, event: Event) -> usize {
        // Snapshot so callbacks may (un)subscribe without deadlocking.
        let callbacks: Vec<EventCallback> = self
            .registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.kind == event.kind)
            .map(|r| Arc::clone(&r.callback))
            .collect();

        trace!(event = %event.kind, callbacks = callbacks.len(), "Dispatching event");
        for callback in &callbacks {
            callback(&event);
        }

        // send() returns Err if there are no observers, which is fine
        let _ = self.sender.send(event);
        callbacks.len()
    }

    /// Number of callbacks registered for `kind`.
    #[must_use]
    pub fn callback_count(&self, kind: &EventKind) -> usize {
        self.registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| &r.kind == kind)
            .count()
    }

    /// Number of active broadcast observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventSource for EventBus {
    fn subscribe(&self, kinds: &[EventKind], callback: EventCallback) {
        let mut registrations = self
            .registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for kind in kinds {
            let exists = registrations
                .iter()
                .any(|r| &r.kind == kind && same_callback(&r.callback, &callback));
            if !exists {
                registrations.push(Registration {
                    kind: kind.clone(),
                    callback: Arc::clone(&callback),
                });
            }
        }
    }

    fn unsubscribe(&self, kinds: &[EventKind], callback: &EventCallback) {
        self.registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|r| !(kinds.contains(&r.kind) && same_callback(&r.callback, callback)));
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
