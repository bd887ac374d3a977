//! Store traits — the contracts the synchronization layer consumes.
//!
//! Implementations own the observable state and perform the remote work; the
//! sync layer only reads their observables and calls their async operations.
//! All operations may be called concurrently; serializing or coalescing
//! concurrent calls of the same kind is the implementation's responsibility.

use async_trait::async_trait;

use crate::{error::Result, page::Page, reactive::Observable};

// ============================================================================
// Store — keyed single entity
// ============================================================================

/// Reactive cache of single entities keyed by id.
#[async_trait]
pub trait Store<T>: Send + Sync {
    /// Observable holding the entity for `id` (`None` if never fetched or absent).
    fn observable(&self, id: &str) -> Observable<Option<T>>;

    /// Fetch the entity for `id` and publish it.
    async fn fetch(&self, id: &str) -> Result<()>;
}

// ============================================================================
// PaginatedStore — one unscoped paginated collection
// ============================================================================

/// Reactive cache for a single paginated collection.
///
/// `A` is the argument bundle forwarded to the backend (filters, sort, ...).
#[async_trait]
pub trait PaginatedStore<T, A>: Send + Sync {
    /// The currently published page, `None` before the first successful list.
    fn paginated_items(&self) -> Observable<Option<Page<T>>>;

    /// True while a replacing `list` is outstanding.
    fn fetching(&self) -> Observable<bool>;

    /// True while an appending `list_more` is outstanding.
    fn fetching_more(&self) -> Observable<bool>;

    /// Fetch the first page, replacing whatever is published.
    async fn list(&self, args: &A) -> Result<()>;

    /// Fetch the next page and publish it according to the store's
    /// accumulation policy.
    async fn list_more(&self, args: &A) -> Result<()>;
}

// ============================================================================
// MappedStore — independent paginated collections keyed by string
// ============================================================================

/// Reactive cache for many independent paginated collections, one per key.
#[async_trait]
pub trait MappedStore<T, A>: Send + Sync {
    fn observable_items(&self, key: &str) -> Observable<Option<Page<T>>>;

    fn fetching(&self, key: &str) -> Observable<bool>;

    fn fetching_more(&self, key: &str) -> Observable<bool>;

    async fn list(&self, key: &str, args: &A) -> Result<()>;

    async fn list_more(&self, key: &str, args: &A) -> Result<()>;
}
