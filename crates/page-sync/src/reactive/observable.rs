//! Observable<V> — a single-value reactive holder.
//!
//! An `Observable` is a cheap `Clone` handle; all clones share the same value
//! and listener list. Publishing swaps the value under the lock and then
//! notifies a snapshot of the listeners with the lock released, so:
//!   - a subscriber never observes a partially-updated value,
//!   - a listener removed *during* notification is still called in that round,
//!   - a listener added *during* notification is NOT called until the next publish,
//!   - listeners may call `get()`/`set()`/`subscribe()` without deadlocking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// Identifier of a registered listener.
pub type ListenerId = u64;

/// Closure type for value listeners.
pub type ListenerFn<V> = dyn Fn(&V) + Send + Sync;

/// An owned one-shot closure that removes a subscription when called.
pub type Unsubscribe = Box<dyn FnOnce() + Send + Sync>;

struct Shared<V> {
    value: Mutex<V>,
    listeners: Mutex<Vec<(ListenerId, Arc<ListenerFn<V>>)>>,
    next_id: AtomicU64,
}

impl<V> Shared<V> {
    fn remove(&self, id: ListenerId) {
        self.listeners.lock().retain(|(lid, _)| *lid != id);
    }
}

/// Shared, subscribable value holder.
pub struct Observable<V> {
    shared: Arc<Shared<V>>,
}

impl<V> Clone for Observable<V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<V: Clone + Send + 'static> Observable<V> {
    pub fn new(value: V) -> Self {
        Self {
            shared: Arc::new(Shared {
                value: Mutex::new(value),
                listeners: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Current value (cloned).
    pub fn get(&self) -> V {
        self.shared.value.lock().clone()
    }

    /// Read the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&V) -> R) -> R {
        f(&self.shared.value.lock())
    }

    /// Publish `value` and notify every listener.
    pub fn set(&self, value: V) {
        let published = {
            let mut guard = self.shared.value.lock();
            *guard = value;
            guard.clone()
        };
        self.notify(&published);
    }

    /// Mutate the value in place, then notify.
    pub fn update(&self, f: impl FnOnce(&mut V)) {
        let published = {
            let mut guard = self.shared.value.lock();
            f(&mut guard);
            guard.clone()
        };
        self.notify(&published);
    }

    /// Register `callback`, called with every published value.
    ///
    /// The returned closure removes the listener; it holds only a weak
    /// reference, so it never keeps the observable alive.
    pub fn subscribe(&self, callback: impl Fn(&V) + Send + Sync + 'static) -> Unsubscribe {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        self.shared
            .listeners
            .lock()
            .push((id, Arc::new(callback)));

        let weak: Weak<Shared<V>> = Arc::downgrade(&self.shared);
        Box::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.remove(id);
            }
        })
    }

    /// Number of currently registered listeners.
    pub fn listener_count(&self) -> usize {
        self.shared.listeners.lock().len()
    }

    /// True when both handles point at the same underlying holder.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    fn notify(&self, value: &V) {
        let snapshot: Vec<Arc<ListenerFn<V>>> = {
            let guard = self.shared.listeners.lock();
            guard.iter().map(|(_, cb)| Arc::clone(cb)).collect()
        };
        for cb in snapshot {
            cb(value);
        }
    }
}

impl<V: Clone + PartialEq + Send + 'static> Observable<V> {
    /// Publish only when `value` differs from the current one.
    ///
    /// Returns whether listeners were notified.
    pub fn set_if_changed(&self, value: V) -> bool {
        let published = {
            let mut guard = self.shared.value.lock();
            if *guard == value {
                return false;
            }
            *guard = value;
            guard.clone()
        };
        self.notify(&published);
        true
    }
}

impl<V: Clone + Default + Send + 'static> Default for Observable<V> {
    fn default() -> Self {
        Self::new(V::default())
    }
}

impl<V: fmt::Debug> fmt::Debug for Observable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*self.shared.value.lock())
            .field("listeners", &self.shared.listeners.lock().len())
            .finish()
    }
}
