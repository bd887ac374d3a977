//! In-memory reference stores over user-provided sources.
//!
//! Each paginated identity (the single collection of a
//! [`MemoryPaginatedStore`], or one key of a [`MemoryMappedStore`]) owns a
//! [`PageSlot`] with its page/fetching/fetching-more observables and a list
//! generation:
//!   - `list` bumps the generation; a result whose generation was superseded
//!     by a newer `list` is dropped instead of published.
//!   - `list_more` requests `page + 1` and appends it to the published page.
//!     It is a no-op without a page, with an unknown total, at the last
//!     page or while a `list` is outstanding; a second call while one is
//!     outstanding returns immediately; its result is dropped if a `list`
//!     started meanwhile.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{error::Result, page::Page, reactive::Observable};

use super::source::{EntitySource, PageRequest, PageSource};
use super::traits::{MappedStore, PaginatedStore, Store};

// ============================================================================
// Options
// ============================================================================

/// Configuration shared by the paginated memory stores.
#[derive(Debug, Clone, Default)]
pub struct PaginationOptions {
    /// Index of the first page requested by `list` (default: 1).
    pub first_page: Option<u32>,
}

impl PaginationOptions {
    fn first_page(&self) -> u32 {
        self.first_page.unwrap_or(1)
    }
}

// ============================================================================
// MemoryStore
// ============================================================================

/// Entity store keeping one observable per id.
pub struct MemoryStore<T> {
    source: Arc<dyn EntitySource<T>>,
    entities: Mutex<HashMap<String, Observable<Option<T>>>>,
}

impl<T: Clone + Send + Sync + 'static> MemoryStore<T> {
    pub fn new(source: Arc<dyn EntitySource<T>>) -> Self {
        Self {
            source,
            entities: Mutex::new(HashMap::new()),
        }
    }

    /// Publish `value` for `id` without going through the source.
    pub fn prime(&self, id: &str, value: T) {
        self.observable(id).set(Some(value));
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> Store<T> for MemoryStore<T> {
    fn observable(&self, id: &str) -> Observable<Option<T>> {
        self.entities
            .lock()
            .entry(id.to_string())
            .or_insert_with(|| Observable::new(None))
            .clone()
    }

    async fn fetch(&self, id: &str) -> Result<()> {
        let entity = self.source.fetch_entity(id).await?;
        if entity.is_none() {
            tracing::debug!(id, "entity not present at source");
        }
        self.observable(id).set(entity);
        Ok(())
    }
}

// ============================================================================
// PageSlot — per-identity pagination state
// ============================================================================

struct PageSlot<T> {
    items: Observable<Option<Page<T>>>,
    fetching: Observable<bool>,
    fetching_more: Observable<bool>,
    /// Incremented by every `list`.
    generation: AtomicU64,
    more_in_flight: AtomicBool,
}

impl<T: Clone + Send + Sync + 'static> PageSlot<T> {
    fn new() -> Self {
        Self {
            items: Observable::new(None),
            fetching: Observable::new(false),
            fetching_more: Observable::new(false),
            generation: AtomicU64::new(0),
            more_in_flight: AtomicBool::new(false),
        }
    }

    async fn list<A: Send + Sync>(
        &self,
        source: &dyn PageSource<T, A>,
        key: Option<&str>,
        args: &A,
        options: &PaginationOptions,
    ) -> Result<()> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.fetching.set_if_changed(true);

        let result = source
            .fetch_page(PageRequest {
                key,
                args,
                page: options.first_page(),
            })
            .await;

        if self.generation.load(Ordering::SeqCst) != generation {
            // A newer list owns the fetching flag and the published page.
            tracing::debug!(?key, generation, "discarding superseded list result");
            return result.map(|_| ());
        }

        let outcome = match result {
            Ok(page) => {
                self.items.set(Some(page));
                Ok(())
            }
            Err(e) => Err(e),
        };
        self.fetching.set_if_changed(false);
        outcome
    }

    async fn list_more<A: Send + Sync>(
        &self,
        source: &dyn PageSource<T, A>,
        key: Option<&str>,
        args: &A,
        options: &PaginationOptions,
    ) -> Result<()> {
        // Taken before reading the page so a list starting after this point
        // still invalidates the append.
        let generation = self.generation.load(Ordering::SeqCst);
        if self.fetching.get() {
            // The published page belongs to the query being replaced.
            tracing::trace!(?key, "list_more skipped: list outstanding");
            return Ok(());
        }

        let first_page = options.first_page();
        let next_page = self.items.with(|items| {
            items.as_ref().and_then(|page| {
                let total = page.total_pages?;
                let fetched = page.page.saturating_sub(first_page).checked_add(1)?;
                if fetched < total {
                    page.page.checked_add(1)
                } else {
                    None
                }
            })
        });
        let Some(next_page) = next_page else {
            tracing::trace!(?key, "list_more skipped: no further pages known");
            return Ok(());
        };

        if self.more_in_flight.swap(true, Ordering::SeqCst) {
            tracing::trace!(?key, "list_more coalesced with outstanding request");
            return Ok(());
        }
        self.fetching_more.set_if_changed(true);

        let result = source
            .fetch_page(PageRequest {
                key,
                args,
                page: next_page,
            })
            .await;

        self.more_in_flight.store(false, Ordering::SeqCst);
        let stale = self.generation.load(Ordering::SeqCst) != generation;

        let outcome = match result {
            Ok(_) if stale => {
                tracing::debug!(
                    ?key,
                    page = next_page,
                    "discarding list_more result after newer list"
                );
                Ok(())
            }
            Ok(next) => {
                self.items.update(|items| {
                    *items = Some(match items.take() {
                        Some(current) => current.append(next),
                        None => next,
                    });
                });
                Ok(())
            }
            Err(e) => Err(e),
        };
        self.fetching_more.set_if_changed(false);
        outcome
    }
}

// ============================================================================
// MemoryPaginatedStore
// ============================================================================

/// Single paginated collection accumulating pages fetched from a source.
pub struct MemoryPaginatedStore<T, A> {
    source: Arc<dyn PageSource<T, A>>,
    options: PaginationOptions,
    slot: PageSlot<T>,
}

impl<T, A> MemoryPaginatedStore<T, A>
where
    T: Clone + Send + Sync + 'static,
    A: Send + Sync + 'static,
{
    pub fn new(source: Arc<dyn PageSource<T, A>>, options: PaginationOptions) -> Self {
        Self {
            source,
            options,
            slot: PageSlot::new(),
        }
    }
}

#[async_trait]
impl<T, A> PaginatedStore<T, A> for MemoryPaginatedStore<T, A>
where
    T: Clone + Send + Sync + 'static,
    A: Send + Sync + 'static,
{
    fn paginated_items(&self) -> Observable<Option<Page<T>>> {
        self.slot.items.clone()
    }

    fn fetching(&self) -> Observable<bool> {
        self.slot.fetching.clone()
    }

    fn fetching_more(&self) -> Observable<bool> {
        self.slot.fetching_more.clone()
    }

    async fn list(&self, args: &A) -> Result<()> {
        self.slot
            .list(self.source.as_ref(), None, args, &self.options)
            .await
    }

    async fn list_more(&self, args: &A) -> Result<()> {
        self.slot
            .list_more(self.source.as_ref(), None, args, &self.options)
            .await
    }
}

// ============================================================================
// MemoryMappedStore
// ============================================================================

/// Independent paginated collections, one [`PageSlot`] per key.
pub struct MemoryMappedStore<T, A> {
    source: Arc<dyn PageSource<T, A>>,
    options: PaginationOptions,
    slots: Mutex<HashMap<String, Arc<PageSlot<T>>>>,
}

impl<T, A> MemoryMappedStore<T, A>
where
    T: Clone + Send + Sync + 'static,
    A: Send + Sync + 'static,
{
    pub fn new(source: Arc<dyn PageSource<T, A>>, options: PaginationOptions) -> Self {
        Self {
            source,
            options,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Keys that have been touched so far.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.slots.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn slot(&self, key: &str) -> Arc<PageSlot<T>> {
        let mut slots = self.slots.lock();
        slots
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(PageSlot::new()))
            .clone()
    }
}

#[async_trait]
impl<T, A> MappedStore<T, A> for MemoryMappedStore<T, A>
where
    T: Clone + Send + Sync + 'static,
    A: Send + Sync + 'static,
{
    fn observable_items(&self, key: &str) -> Observable<Option<Page<T>>> {
        self.slot(key).items.clone()
    }

    fn fetching(&self, key: &str) -> Observable<bool> {
        self.slot(key).fetching.clone()
    }

    fn fetching_more(&self, key: &str) -> Observable<bool> {
        self.slot(key).fetching_more.clone()
    }

    async fn list(&self, key: &str, args: &A) -> Result<()> {
        let slot = self.slot(key);
        slot.list(self.source.as_ref(), Some(key), args, &self.options)
            .await
    }

    async fn list_more(&self, key: &str, args: &A) -> Result<()> {
        let slot = self.slot(key);
        slot.list_more(self.source.as_ref(), Some(key), args, &self.options)
            .await
    }
}
