use super::{EventType, KiroEvent};
use std::collections::{BTreeMap, HashMap};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};
use tokio::sync::mpsc;

/// Callback invoked for each matching event.
pub type EventCallback = Arc<dyn Fn(&KiroEvent) + Send + Sync + 'static>;

#[derive(Default)]
struct Registry {
    next_key: u64,
    // Keyed by insertion order so callbacks fire in subscription order
    by_type: HashMap<String, BTreeMap<u64, EventCallback>>,
}

impl Registry {
    fn remove(&mut self, type_key: &str, key: u64) -> bool {
        let Some(callbacks) = self.by_type.get_mut(type_key) else {
            return false;
        };
        let removed = callbacks.remove(&key).is_some();
        if callbacks.is_empty() {
            self.by_type.remove(type_key);
        }
        removed
    }
}

/// Routes incoming events to registered subscribers.
///
/// Exact-type subscribers are called first, then wildcard (`"*"`) ones.
/// Callbacks run after the registry lock is released, so a callback may
/// subscribe or unsubscribe without deadlocking.
#[derive(Clone, Default)]
pub struct EventRouter {
    registry: Arc<Mutex<Registry>>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `callback` for `event_type` and returns its handle.
    pub fn subscribe<F>(&self, event_type: impl Into<EventType>, callback: F) -> Subscription
    where
        F: Fn(&KiroEvent) + Send + Sync + 'static,
    {
        let event_type = event_type.into();
        let callback: EventCallback = Arc::new(callback);

        let key = {
            let mut registry = self.lock();
            registry.next_key += 1;
            let key = registry.next_key;
            registry
                .by_type
                .entry(event_type.as_str().to_string())
                .or_default()
                .insert(key, Arc::clone(&callback));
            key
        };

        let id = format!("{}-{}", event_type, uuid::Uuid::new_v4());
        tracing::debug!("Registered subscription {}", id);

        Subscription {
            id,
            event_type,
            key,
            callback,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Registers a subscription that forwards events into a channel.
    ///
    /// The subscription removes itself on the first event delivered after
    /// the receiver is dropped.
    pub fn subscribe_channel(
        &self,
        event_type: impl Into<EventType>,
    ) -> (Subscription, mpsc::UnboundedReceiver<KiroEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_type = event_type.into();
        let type_key = event_type.as_str().to_string();
        let own_key = Arc::new(OnceLock::new());
        let registry = Arc::downgrade(&self.registry);

        let subscription = {
            let own_key = Arc::clone(&own_key);
            self.subscribe(event_type, move |event: &KiroEvent| {
                if tx.send(event.clone()).is_ok() {
                    return;
                }
                let (Some(key), Some(registry)) = (own_key.get(), registry.upgrade()) else {
                    return;
                };
                let mut registry = registry.lock().unwrap_or_else(PoisonError::into_inner);
                if registry.remove(&type_key, *key) {
                    tracing::debug!("Event receiver for '{}' dropped, unsubscribed", type_key);
                }
            })
        };
        let _ = own_key.set(subscription.key);
        (subscription, rx)
    }

    pub fn unsubscribe(&self, subscription: &Subscription) {
        subscription.unsubscribe();
    }

    /// Delivers `event` and returns how many callbacks ran to completion.
    pub fn dispatch(&self, event: &KiroEvent) -> usize {
        let (exact, wildcard) = {
            let registry = self.lock();
            let collect = |key: &str| -> Vec<EventCallback> {
                registry
                    .by_type
                    .get(key)
                    .map(|callbacks| callbacks.values().cloned().collect())
                    .unwrap_or_default()
            };
            let exact = if event.event_type.is_wildcard() {
                Vec::new()
            } else {
                collect(event.event_type.as_str())
            };
            (exact, collect(EventType::Wildcard.as_str()))
        };

        let mut delivered = 0;
        for callback in exact.iter().chain(wildcard.iter()) {
            match panic::catch_unwind(AssertUnwindSafe(|| callback(event))) {
                Ok(()) => delivered += 1,
                Err(_) => tracing::error!(
                    "Event callback for '{}' panicked; continuing with remaining subscribers",
                    event.event_type
                ),
            }
        }

        tracing::debug!(
            "Dispatched event {} ({}) to {} subscriber(s)",
            event.id,
            event.event_type,
            delivered
        );
        delivered
    }

    /// Drops every subscription. Existing handles become no-ops.
    pub fn clear(&self) {
        self.lock().by_type.clear();
    }

    pub fn subscriber_count(&self, event_type: impl Into<EventType>) -> usize {
        let event_type = event_type.into();
        self.lock()
            .by_type
            .get(event_type.as_str())
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    /// Number of event types with at least one subscriber.
    pub fn event_type_count(&self) -> usize {
        self.lock().by_type.len()
    }
}

/// Handle to a registered callback.
///
/// Dropping the handle does not unsubscribe; call [`unsubscribe`](Self::unsubscribe).
pub struct Subscription {
    id: String,
    event_type: EventType,
    key: u64,
    callback: EventCallback,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    pub fn callback(&self) -> &EventCallback {
        &self.callback
    }

    /// Removes this callback from the router. Idempotent.
    pub fn unsubscribe(&self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = registry.lock().unwrap_or_else(PoisonError::into_inner);

        if registry.remove(self.event_type.as_str(), self.key) {
            tracing::debug!("Removed subscription {}", self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("event_type", &self.event_type)
            .finish_non_exhaustive()
    }
}
