pub mod error;
pub mod page;

pub mod reactive;
pub mod store;
pub mod sync;

pub use error::{FetchError, Result, SyncError};
pub use page::Page;
