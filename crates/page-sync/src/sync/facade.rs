//! Store façades over the paginated engine.
//!
//! [`PaginatedSync`] drives an unscoped [`PaginatedStore`]; [`MappedSync`]
//! drives one key of a [`MappedStore`] at a time. Both close `fetch` /
//! `fetch_more` over the store's `list` / `list_more` with the current
//! arguments, and report the store's fetch-state pair as `loading` /
//! `more_loading`.
//!
//! Dependency tuples: `deps ++ args` for the unscoped store,
//! `key ++ deps ++ args` for the mapped store. Arguments are serialized into
//! the tuple, so changing a filter re-issues a replace fetch.

use std::sync::Arc;

use serde::Serialize;

use crate::{
    error::SyncError,
    reactive::{Deps, Memoized, Observable, Unsubscribe},
    store::{MappedStore, PaginatedStore},
};

use super::effect::bump;
use super::paginated::PaginatedData;
use super::types::{fetch_fn, FetchFn, PaginatedDataResult, SyncOptions};

// ============================================================================
// PaginatedSync
// ============================================================================

pub struct PaginatedSync<T, A> {
    store: Arc<dyn PaginatedStore<T, A>>,
    engine: PaginatedData<T>,
    subscriptions: Vec<Unsubscribe>,
}

impl<T, A> PaginatedSync<T, A>
where
    T: Clone + Send + Sync + 'static,
    A: Serialize + Send + Sync + 'static,
{
    pub fn new(store: Arc<dyn PaginatedStore<T, A>>, options: SyncOptions) -> Self {
        let engine = PaginatedData::new(options);
        let subscriptions = [store.fetching(), store.fetching_more()]
            .into_iter()
            .map(|flag| {
                let changes = engine.changes().clone();
                flag.subscribe(move |_| bump(&changes))
            })
            .collect();

        Self {
            store,
            engine,
            subscriptions,
        }
    }

    /// Synchronize with `deps` and `args`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn sync(&mut self, deps: &Deps, args: A) -> Result<PaginatedDataResult<T>, SyncError> {
        let deps = deps.clone().extend(Deps::from_serialize(&args)?);
        let args = Arc::new(args);

        let fetch = {
            let store = Arc::clone(&self.store);
            let args = Arc::clone(&args);
            fetch_fn(move || {
                let store = Arc::clone(&store);
                let args = Arc::clone(&args);
                async move { store.list(&args).await }
            })
        };
        let fetch_more = {
            let store = Arc::clone(&self.store);
            fetch_fn(move || {
                let store = Arc::clone(&store);
                let args = Arc::clone(&args);
                async move { store.list_more(&args).await }
            })
        };

        let view = self
            .engine
            .sync(self.store.paginated_items(), fetch, fetch_more, &deps);
        Ok(PaginatedDataResult::new(
            view,
            self.store.fetching().get(),
            self.store.fetching_more().get(),
        ))
    }

    /// Re-read the view for the inputs of the last `sync`.
    pub fn view(&self) -> Option<PaginatedDataResult<T>> {
        let view = self.engine.view()?;
        Some(PaginatedDataResult::new(
            view,
            self.store.fetching().get(),
            self.store.fetching_more().get(),
        ))
    }

    /// Register `callback`, called when the page, error or a fetch flag changes.
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> Unsubscribe {
        self.engine.subscribe(callback)
    }

    pub async fn settled(&mut self) {
        self.engine.settled().await;
    }

    /// Number of triggered (replace) fetches issued so far.
    pub fn fetch_count(&self) -> u64 {
        self.engine.fetch_count()
    }
}

impl<T, A> Drop for PaginatedSync<T, A> {
    fn drop(&mut self) {
        for unsubscribe in self.subscriptions.drain(..) {
            unsubscribe();
        }
    }
}

// ============================================================================
// MappedSync
// ============================================================================

pub struct MappedSync<T, A> {
    store: Arc<dyn MappedStore<T, A>>,
    engine: PaginatedData<T>,
    fetching: Memoized<bool>,
    fetching_more: Memoized<bool>,
}

impl<T, A> MappedSync<T, A>
where
    T: Clone + Send + Sync + 'static,
    A: Serialize + Send + Sync + 'static,
{
    pub fn new(store: Arc<dyn MappedStore<T, A>>, options: SyncOptions) -> Self {
        Self {
            store,
            engine: PaginatedData::new(options),
            fetching: Memoized::new(),
            fetching_more: Memoized::new(),
        }
    }

    /// Synchronize the collection under `key` with `deps` and `args`.
    ///
    /// Switching `key` issues a replace fetch for the new collection and
    /// re-subscribes the page and fetch-state observables to it.
    /// Must be called from within a Tokio runtime.
    pub fn sync(
        &mut self,
        key: &str,
        deps: &Deps,
        args: A,
    ) -> Result<PaginatedDataResult<T>, SyncError> {
        let key_deps = Deps::new().with(key);
        let deps = key_deps
            .clone()
            .extend(deps.clone())
            .extend(Deps::from_serialize(&args)?);
        let args = Arc::new(args);

        let loading = self.select_flag(&key_deps, key, false);
        let more_loading = self.select_flag(&key_deps, key, true);

        let fetch = self.list_fn(key, &args, false);
        let fetch_more = self.list_fn(key, &args, true);
        let view = self
            .engine
            .sync(self.store.observable_items(key), fetch, fetch_more, &deps);

        Ok(PaginatedDataResult::new(view, loading.get(), more_loading.get()))
    }

    /// Re-read the view for the key and inputs of the last `sync`.
    pub fn view(&self) -> Option<PaginatedDataResult<T>> {
        let view = self.engine.view()?;
        let loading = self.fetching.current()?.get();
        let more_loading = self.fetching_more.current()?.get();
        Some(PaginatedDataResult::new(view, loading, more_loading))
    }

    /// Register `callback`, called when the page, error or a fetch flag of
    /// the selected key changes.
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> Unsubscribe {
        self.engine.subscribe(callback)
    }

    pub async fn settled(&mut self) {
        self.engine.settled().await;
    }

    /// Number of triggered (replace) fetches issued so far.
    pub fn fetch_count(&self) -> u64 {
        self.engine.fetch_count()
    }

    fn select_flag(&mut self, key_deps: &Deps, key: &str, more: bool) -> Observable<bool> {
        let store = &self.store;
        let changes = self.engine.changes().clone();
        let memo = if more {
            &mut self.fetching_more
        } else {
            &mut self.fetching
        };
        memo.select(
            key_deps,
            || {
                if more {
                    store.fetching_more(key)
                } else {
                    store.fetching(key)
                }
            },
            move |_| bump(&changes),
        )
    }

    fn list_fn(&self, key: &str, args: &Arc<A>, more: bool) -> FetchFn {
        let store = Arc::clone(&self.store);
        let key = key.to_string();
        let args = Arc::clone(args);
        fetch_fn(move || {
            let store = Arc::clone(&store);
            let key = key.clone();
            let args = Arc::clone(&args);
            async move {
                if more {
                    store.list_more(&key, &args).await
                } else {
                    store.list(&key, &args).await
                }
            }
        })
    }
}
