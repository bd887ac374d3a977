//! FetchEffect — runs dependency-triggered fetches in the background.
//!
//! Each spawned fetch is stamped with a generation. Its failure is captured
//! into the `error` observable instead of being returned, and the optional
//! `loading` flag is raised before the fetch starts and lowered once it
//! settles. With `discard_stale`, a fetch superseded by a newer one leaves
//! error and loading untouched when it completes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::{error::FetchError, reactive::Observable};

use super::types::{BoxFetch, ResolvedOptions};

pub(crate) struct FetchEffect {
    options: ResolvedOptions,
    generation: Arc<AtomicU64>,
    error: Observable<Option<FetchError>>,
    loading: Option<Observable<bool>>,
    pending: Vec<JoinHandle<()>>,
}

impl FetchEffect {
    pub fn new(
        options: ResolvedOptions,
        error: Observable<Option<FetchError>>,
        loading: Option<Observable<bool>>,
    ) -> Self {
        Self {
            options,
            generation: Arc::new(AtomicU64::new(0)),
            error,
            loading,
            pending: Vec::new(),
        }
    }

    /// Spawn `fetch` on the current Tokio runtime.
    pub fn spawn(&mut self, fetch: BoxFetch) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(loading) = &self.loading {
            loading.set_if_changed(true);
        }

        let latest = Arc::clone(&self.generation);
        let error = self.error.clone();
        let loading = self.loading.clone();
        let options = self.options;

        tracing::debug!(generation, "dependencies changed, triggering fetch");
        let handle = tokio::spawn(async move {
            let outcome = fetch.await;

            if options.discard_stale && latest.load(Ordering::SeqCst) != generation {
                tracing::debug!(generation, "discarding outcome of superseded fetch");
                return;
            }

            match outcome {
                Ok(()) => {
                    if options.clear_error_on_success {
                        error.set_if_changed(None);
                    }
                }
                Err(e) => {
                    tracing::warn!(generation, error = %e, "triggered fetch failed");
                    error.set(Some(e));
                }
            }
            if let Some(loading) = loading {
                loading.set_if_changed(false);
            }
        });

        self.pending.retain(|h| !h.is_finished());
        self.pending.push(handle);
    }

    /// Wait until every spawned fetch has completed.
    pub async fn settle(&mut self) {
        for handle in self.pending.drain(..) {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "triggered fetch task did not complete");
            }
        }
    }

    /// Number of fetches issued so far.
    pub fn issued(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

/// Advance a change counter so its subscribers re-read their view.
pub(crate) fn bump(changes: &Observable<u64>) {
    changes.update(|version| *version = version.wrapping_add(1));
}
