use std::any::Any;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::trie::Trie;
use crate::value::{StateValue, SubscriptionId};

/// Callback invoked with `(path, new_value)` after a write.
pub type ChangeHandler = Arc<dyn Fn(&str, &StateValue) + Send + Sync>;

/// Path-addressed state with pattern subscriptions.
///
/// The store is the single owner of view state. A resolution rendered both in
/// the feed and in the detail panel reads the same `interaction/{id}` entry;
/// neither view keeps a private copy.
///
/// Writes (`set`, `update`, `upsert`) replace the whole value at a path and
/// then notify every subscriber whose pattern matches. Notification happens
/// after the write lock is released, so a subscriber may read the store.
pub struct StateStore {
    values: RwLock<BTreeMap<String, StateValue>>,
    handlers: Trie<Subscriber>,
    next_id: AtomicU64,
}

#[derive(Clone)]
struct Subscriber {
    id: SubscriptionId,
    handler: ChangeHandler,
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(BTreeMap::new()),
            handlers: Trie::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Store `value` at `path` and notify.
    pub fn set<T: Any + Send + Sync>(&self, path: &str, value: T) {
        let value = StateValue::new(value);
        {
            let mut values = self.values.write().unwrap();
            values.insert(path.to_string(), value.clone());
        }
        self.notify(path, &value);
    }

    pub fn get(&self, path: &str) -> Option<StateValue> {
        self.values.read().unwrap().get(path).cloned()
    }

    /// Typed read: clone the value at `path` out as `T`.
    pub fn get_as<T: Any + Clone>(&self, path: &str) -> Option<T> {
        self.get(path).and_then(|v| v.cloned::<T>())
    }

    /// Read-modify-write of a typed value under a single write lock.
    ///
    /// Returns `None` (and changes nothing) if nothing of type `T` lives at
    /// `path`. Otherwise `f` edits a copy, the copy replaces the old value,
    /// subscribers are notified, and `f`'s result is returned.
    pub fn update<T, R, F>(&self, path: &str, f: F) -> Option<R>
    where
        T: Any + Send + Sync + Clone,
        F: FnOnce(&mut T) -> R,
    {
        let (value, out) = {
            let mut values = self.values.write().unwrap();
            let mut current = values.get(path)?.cloned::<T>()?;
            let out = f(&mut current);
            let value = StateValue::new(current);
            values.insert(path.to_string(), value.clone());
            (value, out)
        };
        self.notify(path, &value);
        Some(out)
    }

    /// Conditional read-modify-write: the edit is committed (and subscribers
    /// notified) only when `f` returns `Ok`. On `Err` the stored value is
    /// left untouched.
    pub fn try_update<T, R, E, F>(&self, path: &str, f: F) -> Option<Result<R, E>>
    where
        T: Any + Send + Sync + Clone,
        F: FnOnce(&mut T) -> Result<R, E>,
    {
        let (value, out) = {
            let mut values = self.values.write().unwrap();
            let mut current = values.get(path)?.cloned::<T>()?;
            match f(&mut current) {
                Ok(out) => {
                    let value = StateValue::new(current);
                    values.insert(path.to_string(), value.clone());
                    (value, out)
                }
                Err(e) => return Some(Err(e)),
            }
        };
        self.notify(path, &value);
        Some(Ok(out))
    }

    /// Like [`update`](Self::update), but inserts `init()` first when the
    /// path is empty (or holds another type).
    pub fn upsert<T, R, I, F>(&self, path: &str, init: I, f: F) -> R
    where
        T: Any + Send + Sync + Clone,
        I: FnOnce() -> T,
        F: FnOnce(&mut T) -> R,
    {
        let (value, out) = {
            let mut values = self.values.write().unwrap();
            let mut current = values
                .get(path)
                .and_then(|v| v.cloned::<T>())
                .unwrap_or_else(init);
            let out = f(&mut current);
            let value = StateValue::new(current);
            values.insert(path.to_string(), value.clone());
            (value, out)
        };
        self.notify(path, &value);
        out
    }

    /// Drop the value at `path`. Subscribers are not notified.
    pub fn remove(&self, path: &str) -> Option<StateValue> {
        self.values.write().unwrap().remove(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.values.read().unwrap().contains_key(path)
    }

    /// Entries strictly below `prefix` (i.e. `{prefix}/...`), in path order.
    pub fn scan(&self, prefix: &str) -> Vec<(String, StateValue)> {
        let start = format!("{}/", prefix);
        let values = self.values.read().unwrap();
        values
            .range(start.clone()..)
            .take_while(|(k, _)| k.starts_with(&start))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register `handler` for every write whose path matches `pattern`.
    pub fn subscribe<F>(&self, pattern: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &StateValue) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.insert(
            pattern,
            Subscriber {
                id,
                handler: Arc::new(handler),
            },
        );
        id
    }

    pub fn unsubscribe(&self, pattern: &str, id: SubscriptionId) -> bool {
        self.handlers.remove(pattern, |s| s.id == id)
    }

    fn notify(&self, path: &str, value: &StateValue) {
        for sub in self.handlers.matches(path) {
            (sub.handler)(path, value);
        }
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
