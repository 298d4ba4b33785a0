use std::any::Any;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::trace;

use crate::pattern::topic_matches;
use crate::value::{StateValue, SubscriptionId};

/// Callback type for state change notifications.
pub type ChangeHandler = Arc<dyn Fn(&str, &StateValue) + Send + Sync>;

/// Per-path state store with pattern subscriptions.
///
/// - `set(path, value)` stores a value and notifies all matching subscribers.
/// - `get(path)` reads the current value (Arc clone).
/// - `subscribe(pattern, handler)` registers a change handler.
/// - `unsubscribe(pattern, id)` removes it again.
///
/// Handlers run synchronously on the thread that calls `set`, after the new
/// value is visible to `get`, and with no internal lock held, so a handler
/// may read from or write to the store.
pub struct StateStore {
    values: RwLock<BTreeMap<String, StateValue>>,
    handlers: RwLock<Vec<HandlerEntry>>,
    next_id: AtomicU64,
}

#[derive(Clone)]
struct HandlerEntry {
    id: SubscriptionId,
    pattern: String,
    handler: ChangeHandler,
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(BTreeMap::new()),
            handlers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Set a typed value at the given path and notify matching subscribers.
    pub fn set<T: Any + Send + Sync>(&self, path: &str, value: T) {
        self.set_value(path, StateValue::new(value));
    }

    /// Set a pre-built StateValue at the given path and notify matching subscribers.
    pub fn set_value(&self, path: &str, value: StateValue) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_string(), value.clone());

        let matching: Vec<ChangeHandler> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|entry| topic_matches(&entry.pattern, path))
            .map(|entry| Arc::clone(&entry.handler))
            .collect();

        trace!(path, subscribers = matching.len(), "state changed");
        for handler in matching {
            handler(path, &value);
        }
    }

    /// Get the current state value at the given path.
    pub fn get(&self, path: &str) -> Option<StateValue> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    /// Read the value at `path` as `T`, cloned out of the store.
    ///
    /// Returns `None` when the path is unset or holds another type.
    pub fn get_as<T: Any + Clone>(&self, path: &str) -> Option<T> {
        self.get(path).and_then(|v| v.cloned::<T>())
    }

    /// Remove the state value at the given path. Does NOT notify subscribers.
    pub fn remove(&self, path: &str) -> Option<StateValue> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.values.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All paths currently set, in path order.
    pub fn paths(&self) -> Vec<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Subscribe to state changes matching the given pattern.
    pub fn subscribe<F>(&self, pattern: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &StateValue) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(HandlerEntry {
                id,
                pattern: pattern.to_string(),
                handler: Arc::new(handler),
            });
        id
    }

    /// Unsubscribe a handler by its subscription ID and pattern.
    pub fn unsubscribe(&self, pattern: &str, id: SubscriptionId) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|entry| !(entry.id == id && entry.pattern == pattern));
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
