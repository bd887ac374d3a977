use std::sync::Arc;

use thiserror::Error;

// ---------------------------------------------------------------------------
// FetchError
// ---------------------------------------------------------------------------

/// Failure reported by a store or source operation.
///
/// Cloneable so that a captured error can be held in an observable and handed
/// to every consumer of a view.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Fetch failed: {0}")]
    Failed(String),

    #[error("Entity not found: {id}")]
    NotFound { id: String },

    #[error(transparent)]
    Source(Arc<dyn std::error::Error + Send + Sync>),
}

impl FetchError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Wrap an arbitrary error coming out of a transport or backend.
    pub fn source(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Source(Arc::new(err))
    }
}

impl PartialEq for FetchError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Failed(a), Self::Failed(b)) => a == b,
            (Self::NotFound { id: a }, Self::NotFound { id: b }) => a == b,
            (Self::Source(a), Self::Source(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// SyncError
// ---------------------------------------------------------------------------

/// Errors raised while preparing a synchronization pass (never from a fetch).
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Dependency value could not be serialized: {0}")]
    Deps(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Result alias
// ---------------------------------------------------------------------------

pub type Result<T> = std::result::Result<T, FetchError>;
