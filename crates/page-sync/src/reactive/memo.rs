//! Memoized<V> — cached observable selection.
//!
//! Holds the observable chosen by a selector for the current dependency tuple
//! together with the subscription forwarding its changes. The selector only
//! re-runs when the tuple changes; the old subscription is torn down and the
//! newly selected observable subscribed in its place.

use super::deps::{Deps, Trigger};
use super::observable::{Observable, Unsubscribe};

pub struct Memoized<V> {
    trigger: Trigger,
    current: Option<Observable<V>>,
    unsubscribe: Option<Unsubscribe>,
}

impl<V: Clone + Send + 'static> Memoized<V> {
    pub fn new() -> Self {
        Self {
            trigger: Trigger::new(),
            current: None,
            unsubscribe: None,
        }
    }

    /// Return the observable for `deps`, running `selector` if `deps` changed.
    ///
    /// `on_change` is attached to a newly selected observable only; when the
    /// selector hands back the same holder the existing subscription is kept.
    pub fn select(
        &mut self,
        deps: &Deps,
        selector: impl FnOnce() -> Observable<V>,
        on_change: impl Fn(&V) + Send + Sync + 'static,
    ) -> Observable<V> {
        let changed = self.trigger.observe(deps);
        if let Some(current) = &self.current {
            if !changed {
                return current.clone();
            }
        }

        let next = selector();
        if let Some(current) = &self.current {
            if current.ptr_eq(&next) {
                return next;
            }
        }
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
        self.unsubscribe = Some(next.subscribe(on_change));
        self.current = Some(next.clone());
        next
    }

    /// Currently selected observable, if any.
    pub fn current(&self) -> Option<&Observable<V>> {
        self.current.as_ref()
    }

    /// Drop the selection and its subscription.
    pub fn clear(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
        self.current = None;
        self.trigger.reset();
    }
}

impl<V: Clone + Send + 'static> Default for Memoized<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Drop for Memoized<V> {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}
