//! Callback registries behind `on_snapshot` and `on_auth_state_changed`.
//!
//! A registration returns a [`Subscription`]; the callback stays registered
//! until the subscription is dropped or explicitly unsubscribed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Shared callback handle.
pub type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Entry<K, E: ?Sized> {
    id: u64,
    key: K,
    callback: Callback<E>,
}

struct Inner<K, E: ?Sized> {
    next_id: AtomicU64,
    entries: Mutex<Vec<Entry<K, E>>>,
}

impl<K, E: ?Sized> Inner<K, E> {
    fn entries(&self) -> MutexGuard<'_, Vec<Entry<K, E>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Registered callbacks, each tagged with a key used to select who gets
/// notified (a query for snapshot listeners, `()` for auth listeners).
pub struct ListenerSet<K, E: ?Sized> {
    inner: Arc<Inner<K, E>>,
}

impl<K, E> Default for ListenerSet<K, E>
where
    K: Send + 'static,
    E: ?Sized + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, E> ListenerSet<K, E>
where
    K: Send + 'static,
    E: ?Sized + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                next_id: AtomicU64::new(1),
                entries: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Register `callback` under `key`.
    pub fn add(&self, key: K, callback: Callback<E>) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.entries().push(Entry { id, key, callback });

        let weak: Weak<Inner<K, E>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.entries().retain(|entry| entry.id != id);
            }
        })
    }

    /// Callbacks whose key satisfies `pred`, cloned out so they can run
    /// without holding the registry lock.
    pub fn matching(&self, pred: impl Fn(&K) -> bool) -> Vec<(K, Callback<E>)>
    where
        K: Clone,
    {
        self.inner
            .entries()
            .iter()
            .filter(|entry| pred(&entry.key))
            .map(|entry| (entry.key.clone(), Arc::clone(&entry.callback)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keeps a listener registered. Dropping it unsubscribes.
#[must_use = "dropping a Subscription immediately unsubscribes the listener"]
pub struct Subscription {
    remove: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    fn new(remove: impl FnOnce() + Send + 'static) -> Self {
        Self {
            remove: Some(Box::new(remove)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.remove.is_some())
            .finish()
    }
}
