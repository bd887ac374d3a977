//! Synchronization layer — derives consumer views from stores.
//!
//! - [`paginated`] — [`PaginatedData<T>`], the paginated engine.
//! - [`entity`] — [`EntitySync<T>`] for single entities.
//! - [`facade`] — [`PaginatedSync`] and [`MappedSync`] over the store traits.
//! - [`types`] — views, fetch closures and [`SyncOptions`].

mod effect;
pub mod entity;
pub mod facade;
pub mod paginated;
pub mod types;

pub use entity::EntitySync;
pub use facade::{MappedSync, PaginatedSync};
pub use paginated::PaginatedData;
pub use types::{
    fetch_fn, AsyncResult, BoxFetch, FetchFn, PageActions, PaginatedDataResult, PaginatedView,
    SyncOptions,
};
