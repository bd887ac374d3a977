//! Sync-layer types: fetch closures, options and consumer-facing views.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::{
    error::{FetchError, Result},
    page::Page,
    reactive::Observable,
};

// ============================================================================
// Fetch closures
// ============================================================================

/// Boxed future returned by a [`FetchFn`].
pub type BoxFetch = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

/// Zero-argument async operation (a replace `fetch` or an append `fetch_more`).
pub type FetchFn = Arc<dyn Fn() -> BoxFetch + Send + Sync>;

/// Box an async closure into a [`FetchFn`].
pub fn fetch_fn<F, Fut>(f: F) -> FetchFn
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(move || Box::pin(f()))
}

// ============================================================================
// SyncOptions
// ============================================================================

/// Configuration for the synchronization engines.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Clear a captured error when a later triggered fetch succeeds
    /// (default: true).
    pub clear_error_on_success: Option<bool>,
    /// Ignore the outcome of a triggered fetch once a newer one was issued
    /// (default: true). `false` lets a late stale fetch overwrite error and
    /// loading state.
    pub discard_stale: Option<bool>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedOptions {
    pub clear_error_on_success: bool,
    pub discard_stale: bool,
}

impl From<&SyncOptions> for ResolvedOptions {
    fn from(options: &SyncOptions) -> Self {
        Self {
            clear_error_on_success: options.clear_error_on_success.unwrap_or(true),
            discard_stale: options.discard_stale.unwrap_or(true),
        }
    }
}

// ============================================================================
// AsyncResult — entity view
// ============================================================================

/// Snapshot of an entity synchronization.
#[derive(Debug, Clone, PartialEq)]
pub struct AsyncResult<T> {
    pub result: Option<T>,
    pub loading: bool,
    pub error: Option<FetchError>,
}

// ============================================================================
// PageActions — fetch / guarded fetch_more
// ============================================================================

/// The operations exposed alongside a paginated view.
pub struct PageActions<T> {
    data: Observable<Option<Page<T>>>,
    fetch: FetchFn,
    fetch_more: FetchFn,
}

impl<T> Clone for PageActions<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            fetch: Arc::clone(&self.fetch),
            fetch_more: Arc::clone(&self.fetch_more),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> PageActions<T> {
    pub(crate) fn new(
        data: Observable<Option<Page<T>>>,
        fetch: FetchFn,
        fetch_more: FetchFn,
    ) -> Self {
        Self {
            data,
            fetch,
            fetch_more,
        }
    }

    /// The replace operation, unchanged. Errors propagate to the caller.
    pub fn fetch(&self) -> BoxFetch {
        (self.fetch)()
    }

    /// Append the next page.
    ///
    /// Resolves to `Ok(())` without calling the append operation when no page
    /// has been observed, the total page count is unknown, or the last page
    /// is already shown. Otherwise the append operation's result is returned
    /// as is.
    pub async fn fetch_more(&self) -> Result<()> {
        let can_fetch = self.data.with(|data| match data {
            Some(page) => {
                matches!(page.total_pages, Some(total) if total > 0) && !page.is_last()
            }
            None => false,
        });
        if !can_fetch {
            tracing::trace!("fetch_more skipped: pagination exhausted or unknown");
            return Ok(());
        }
        (self.fetch_more)().await
    }
}

impl<T> fmt::Debug for PageActions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageActions").finish_non_exhaustive()
    }
}

// ============================================================================
// PaginatedView — engine output
// ============================================================================

/// Snapshot derived by the paginated engine from the observed page.
#[derive(Debug, Clone)]
pub struct PaginatedView<T> {
    /// Content of the current page, empty before the first page.
    pub result: Vec<T>,
    pub total_pages: Option<u32>,
    pub total_size: Option<u64>,
    /// True iff the total is known, a page is observed and `page >= total_pages`.
    pub last_page: bool,
    /// Latest error of a triggered fetch.
    pub error: Option<FetchError>,
    pub actions: PageActions<T>,
}

impl<T: Clone + Send + Sync + 'static> PaginatedView<T> {
    pub(crate) fn derive(
        page: Option<&Page<T>>,
        error: Option<FetchError>,
        actions: PageActions<T>,
    ) -> Self {
        Self {
            result: page.map(|p| p.content.clone()).unwrap_or_default(),
            total_pages: page.and_then(|p| p.total_pages),
            total_size: page.and_then(|p| p.total_size),
            last_page: page.is_some_and(Page::is_last),
            error,
            actions,
        }
    }

    pub fn fetch(&self) -> BoxFetch {
        self.actions.fetch()
    }

    pub async fn fetch_more(&self) -> Result<()> {
        self.actions.fetch_more().await
    }
}

// ============================================================================
// PaginatedDataResult — façade output
// ============================================================================

/// Paginated view combined with the store's fetch-state pair.
#[derive(Debug, Clone)]
pub struct PaginatedDataResult<T> {
    pub result: Vec<T>,
    pub total_pages: Option<u32>,
    pub total_size: Option<u64>,
    pub last_page: bool,
    pub error: Option<FetchError>,
    /// A replacing fetch is outstanding.
    pub loading: bool,
    /// An appending fetch is outstanding.
    pub more_loading: bool,
    pub actions: PageActions<T>,
}

impl<T: Clone + Send + Sync + 'static> PaginatedDataResult<T> {
    pub(crate) fn new(view: PaginatedView<T>, loading: bool, more_loading: bool) -> Self {
        Self {
            result: view.result,
            total_pages: view.total_pages,
            total_size: view.total_size,
            last_page: view.last_page,
            error: view.error,
            loading,
            more_loading,
            actions: view.actions,
        }
    }

    pub fn fetch(&self) -> BoxFetch {
        self.actions.fetch()
    }

    pub async fn fetch_more(&self) -> Result<()> {
        self.actions.fetch_more().await
    }
}
