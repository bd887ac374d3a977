//! EntitySync<T> — keeps one entity of a [`Store`] in sync with an id.
//!
//! Every distinct `(id, deps)` pair issues exactly one `store.fetch(id)`.
//! `loading` is raised before the fetch and lowered once it settles; a
//! failure is captured into `error` (latest wins) and never returned.
//! Concurrent fetches for the same id are not deduplicated here.

use std::sync::Arc;

use crate::{
    error::FetchError,
    reactive::{Deps, Memoized, Observable, Trigger, Unsubscribe},
    store::Store,
};

use super::effect::{bump, FetchEffect};
use super::types::{AsyncResult, ResolvedOptions, SyncOptions};

pub struct EntitySync<T> {
    store: Arc<dyn Store<T>>,
    trigger: Trigger,
    result: Memoized<Option<T>>,
    loading: Observable<bool>,
    error: Observable<Option<FetchError>>,
    effect: FetchEffect,
    changes: Observable<u64>,
}

impl<T: Clone + Send + Sync + 'static> EntitySync<T> {
    pub fn new(store: Arc<dyn Store<T>>, options: SyncOptions) -> Self {
        let loading = Observable::new(false);
        let error = Observable::new(None);
        let changes = Observable::new(0);
        {
            let changes = changes.clone();
            let _ = loading.subscribe(move |_| bump(&changes));
        }
        {
            let changes = changes.clone();
            let _ = error.subscribe(move |_| bump(&changes));
        }

        Self {
            store,
            trigger: Trigger::new(),
            result: Memoized::new(),
            effect: FetchEffect::new(
                ResolvedOptions::from(&options),
                error.clone(),
                Some(loading.clone()),
            ),
            loading,
            error,
            changes,
        }
    }

    /// Synchronize with `id` and the extra dependencies `deps`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn sync(&mut self, id: &str, deps: &Deps) -> AsyncResult<T> {
        let trigger_deps = Deps::new().with(id).extend(deps.clone());
        if self.trigger.observe(&trigger_deps) {
            let store = Arc::clone(&self.store);
            let owned_id = id.to_string();
            self.effect
                .spawn(Box::pin(async move { store.fetch(&owned_id).await }));
        }

        let store = Arc::clone(&self.store);
        let changes = self.changes.clone();
        self.result.select(
            &Deps::new().with(id),
            move || store.observable(id),
            move |_| bump(&changes),
        );

        self.snapshot()
    }

    /// Current result, loading flag and error.
    pub fn snapshot(&self) -> AsyncResult<T> {
        AsyncResult {
            result: self.result.current().and_then(|entity| entity.get()),
            loading: self.loading.get(),
            error: self.error.get(),
        }
    }

    pub fn loading(&self) -> Observable<bool> {
        self.loading.clone()
    }

    pub fn error(&self) -> Observable<Option<FetchError>> {
        self.error.clone()
    }

    /// Register `callback`, called whenever result, loading or error change.
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> Unsubscribe {
        self.changes.subscribe(move |_| callback())
    }

    /// Wait for every triggered fetch issued so far to complete.
    pub async fn settled(&mut self) {
        self.effect.settle().await;
    }

    /// Number of fetches issued so far.
    pub fn fetch_count(&self) -> u64 {
        self.effect.issued()
    }
}
