pub mod memory;
pub mod source;
pub mod traits;

pub use memory::{MemoryMappedStore, MemoryPaginatedStore, MemoryStore, PaginationOptions};
pub use source::{EntitySource, PageRequest, PageSource};
pub use traits::{MappedStore, PaginatedStore, Store};
