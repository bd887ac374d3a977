//! Backend sources — user-provided remote access consumed by the memory
//! stores.
//!
//! Implementations handle the network layer (HTTP, RPC, ...). They return
//! plain values; publishing into observables is done by the store.

use async_trait::async_trait;

use crate::{error::Result, page::Page};

/// Fetches single entities by id.
#[async_trait]
pub trait EntitySource<T>: Send + Sync {
    /// Fetch the entity for `id`. `Ok(None)` means the entity does not exist.
    async fn fetch_entity(&self, id: &str) -> Result<Option<T>>;
}

/// A request for one page.
#[derive(Debug)]
pub struct PageRequest<'a, A> {
    /// Collection key for mapped stores, `None` for an unscoped store.
    pub key: Option<&'a str>,
    pub args: &'a A,
    /// Index of the page to fetch.
    pub page: u32,
}

/// Fetches pages of a collection.
#[async_trait]
pub trait PageSource<T, A>: Send + Sync {
    async fn fetch_page(&self, request: PageRequest<'_, A>) -> Result<Page<T>>;
}
