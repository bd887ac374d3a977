//! PaginatedData<T> — the paginated synchronization engine.
//!
//! # Overview
//!
//! A consumer calls [`PaginatedData::sync`] every time its inputs may have
//! changed, passing the page observable, the replace and append operations
//! and the dependency tuple. The engine:
//!   - spawns exactly one replace `fetch` per distinct tuple (never
//!     `fetch_more`); its failure becomes view state,
//!   - selects the page observable once per tuple and forwards its changes to
//!     [`subscribe`](PaginatedData::subscribe) listeners,
//!   - derives `last_page` and hands out a guarded `fetch_more` whose failures
//!     propagate to the caller.
//!
//! `sync` must be called from within a Tokio runtime.

use crate::{
    error::FetchError,
    page::Page,
    reactive::{Deps, Memoized, Observable, Trigger, Unsubscribe},
};

use super::effect::{bump, FetchEffect};
use super::types::{FetchFn, PageActions, PaginatedView, ResolvedOptions, SyncOptions};

pub struct PaginatedData<T> {
    trigger: Trigger,
    data: Memoized<Option<Page<T>>>,
    error: Observable<Option<FetchError>>,
    effect: FetchEffect,
    changes: Observable<u64>,
    actions: Option<PageActions<T>>,
}

impl<T: Clone + Send + Sync + 'static> PaginatedData<T> {
    pub fn new(options: SyncOptions) -> Self {
        let error = Observable::new(None);
        let changes = Observable::new(0);
        {
            let changes = changes.clone();
            // Lives as long as `error`, which only this engine holds.
            let _ = error.subscribe(move |_| bump(&changes));
        }

        Self {
            trigger: Trigger::new(),
            data: Memoized::new(),
            effect: FetchEffect::new(ResolvedOptions::from(&options), error.clone(), None),
            error,
            changes,
            actions: None,
        }
    }

    /// Synchronize with the current inputs and return the derived view.
    pub fn sync(
        &mut self,
        source: Observable<Option<Page<T>>>,
        fetch: FetchFn,
        fetch_more: FetchFn,
        deps: &Deps,
    ) -> PaginatedView<T> {
        if self.trigger.observe(deps) {
            self.effect.spawn(fetch());
        }

        let changes = self.changes.clone();
        let data = self
            .data
            .select(deps, move || source, move |_| bump(&changes));

        let actions = PageActions::new(data.clone(), fetch, fetch_more);
        self.actions = Some(actions.clone());

        let error = self.error.get();
        data.with(|page| PaginatedView::derive(page.as_ref(), error, actions))
    }

    /// The view for the inputs of the last `sync`, re-derived from the
    /// current page and error.
    pub fn view(&self) -> Option<PaginatedView<T>> {
        let actions = self.actions.clone()?;
        let data = self.data.current()?;
        let error = self.error.get();
        Some(data.with(|page| PaginatedView::derive(page.as_ref(), error, actions)))
    }

    /// Observable of the latest triggered-fetch error.
    pub fn error(&self) -> Observable<Option<FetchError>> {
        self.error.clone()
    }

    /// Register `callback`, called whenever the page or the error changes.
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> Unsubscribe {
        self.changes.subscribe(move |_| callback())
    }

    /// Wait for every triggered fetch issued so far to complete.
    pub async fn settled(&mut self) {
        self.effect.settle().await;
    }

    /// Number of triggered fetches issued so far.
    pub fn fetch_count(&self) -> u64 {
        self.effect.issued()
    }

    pub(crate) fn changes(&self) -> &Observable<u64> {
        &self.changes
    }
}

impl<T: Clone + Send + Sync + 'static> Default for PaginatedData<T> {
    fn default() -> Self {
        Self::new(SyncOptions::default())
    }
}
