//! Tests for `PaginatedSync` and `MappedSync` over the memory stores.

use std::sync::Arc;
use std::time::Duration;

use page_sync::{
    reactive::Deps,
    store::{MemoryMappedStore, MemoryPaginatedStore, PaginationOptions},
    sync::{MappedSync, PaginatedSync, SyncOptions},
    FetchError,
};

use crate::common::{item, MockPageSource};

fn paginated_setup(
    total_pages: Option<u32>,
) -> (Arc<MockPageSource>, PaginatedSync<String, String>) {
    let source = Arc::new(MockPageSource::new(total_pages, 2));
    let store: Arc<MemoryPaginatedStore<String, String>> = Arc::new(MemoryPaginatedStore::new(
        source.clone(),
        PaginationOptions::default(),
    ));
    (source, PaginatedSync::new(store, SyncOptions::default()))
}

fn mapped_setup(total_pages: Option<u32>) -> (Arc<MockPageSource>, MappedSync<String, String>) {
    let source = Arc::new(MockPageSource::new(total_pages, 1));
    let store: Arc<MemoryMappedStore<String, String>> = Arc::new(MemoryMappedStore::new(
        source.clone(),
        PaginationOptions::default(),
    ));
    (source, MappedSync::new(store, SyncOptions::default()))
}

// ============================================================================
// PaginatedSync
// ============================================================================

#[tokio::test]
async fn paginated_sync_lists_first_page() {
    let (source, mut sync) = paginated_setup(Some(3));

    let view = sync.sync(&Deps::new(), "all".to_string()).expect("sync");
    assert!(view.result.is_empty());
    assert!(!view.last_page);

    sync.settled().await;
    let view = sync.view().expect("view");
    assert!(!view.loading);
    assert!(!view.more_loading);
    assert_eq!(view.result, vec![item(None, "all", 1, 0), item(None, "all", 1, 1)]);
    assert_eq!(view.total_pages, Some(3));
    assert_eq!(view.total_size, Some(6));
    assert!(!view.last_page);
    assert_eq!(source.request_count(), 1);
}

#[tokio::test]
async fn paginated_fetch_more_appends_until_last_page() {
    let (source, mut sync) = paginated_setup(Some(2));
    sync.sync(&Deps::new(), "all".to_string()).expect("sync");
    sync.settled().await;

    let view = sync.view().expect("view");
    view.fetch_more().await.expect("fetch_more");

    let view = sync.view().expect("view");
    assert_eq!(view.result.len(), 4);
    assert_eq!(view.result[2], item(None, "all", 2, 0));
    assert!(view.last_page);

    view.fetch_more().await.expect("no-op at last page");
    assert_eq!(source.request_count(), 2);
}

#[tokio::test]
async fn paginated_args_change_relists_from_first_page() {
    let (source, mut sync) = paginated_setup(Some(3));
    sync.sync(&Deps::new(), "open".to_string()).expect("sync");
    sync.settled().await;
    sync.view()
        .expect("view")
        .fetch_more()
        .await
        .expect("fetch_more");

    sync.sync(&Deps::new(), "open".to_string()).expect("same args");
    sync.sync(&Deps::new(), "closed".to_string()).expect("new args");
    sync.settled().await;

    let requests: Vec<(String, u32)> = source
        .requests()
        .into_iter()
        .map(|r| (r.args, r.page))
        .collect();
    assert_eq!(
        requests,
        vec![
            ("open".to_string(), 1),
            ("open".to_string(), 2),
            ("closed".to_string(), 1),
        ]
    );
    let view = sync.view().expect("view");
    assert_eq!(view.result, vec![item(None, "closed", 1, 0), item(None, "closed", 1, 1)]);
    assert_eq!(sync.fetch_count(), 2);
}

#[tokio::test]
async fn paginated_loading_is_true_while_triggered_list_runs() {
    let (source, mut sync) = paginated_setup(Some(3));
    source.delay_for("slow", 40);

    sync.sync(&Deps::new(), "slow".to_string()).expect("sync");
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(sync.view().expect("view").loading);

    sync.settled().await;
    assert!(!sync.view().expect("view").loading);
}

#[tokio::test]
async fn paginated_extra_deps_retrigger_with_same_args() {
    let (source, mut sync) = paginated_setup(Some(3));
    sync.sync(&Deps::new().with(1), "q".to_string()).expect("sync");
    sync.sync(&Deps::new().with(2), "q".to_string()).expect("sync");
    sync.settled().await;

    assert_eq!(source.request_count(), 2);
}

#[tokio::test]
async fn paginated_triggered_failure_is_captured_fetch_more_failure_propagates() {
    let (source, mut sync) = paginated_setup(Some(3));
    source.fail_for("bad", "503");

    sync.sync(&Deps::new(), "bad".to_string()).expect("sync");
    sync.settled().await;
    let view = sync.view().expect("view");
    assert_eq!(view.error, Some(FetchError::failed("503")));
    assert!(!view.loading);

    sync.sync(&Deps::new(), "good".to_string()).expect("sync");
    sync.settled().await;
    let view = sync.view().expect("view");
    assert!(view.error.is_none());

    source.fail_for("good", "429");
    let err = view.fetch_more().await.unwrap_err();
    assert_eq!(err, FetchError::failed("429"));
    assert!(sync.view().expect("view").error.is_none());
}

#[tokio::test]
async fn paginated_more_loading_reflects_outstanding_append() {
    let (source, mut sync) = paginated_setup(Some(3));
    sync.sync(&Deps::new(), "q".to_string()).expect("sync");
    sync.settled().await;
    source.delay_page(2, 40);

    let view = sync.view().expect("view");
    let task = tokio::spawn(async move { view.fetch_more().await });
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(sync.view().expect("view").more_loading);

    task.await.expect("join").expect("fetch_more");
    let view = sync.view().expect("view");
    assert!(!view.more_loading);
    assert_eq!(view.result.len(), 4);
}

// ============================================================================
// MappedSync
// ============================================================================

#[tokio::test]
async fn mapped_key_switch_refetches_and_scopes_state() {
    let (source, mut sync) = mapped_setup(Some(3));
    source.delay_for("q", 30);

    sync.sync("open", &Deps::new(), "q".to_string()).expect("sync");
    sync.settled().await;
    let view = sync.view().expect("view");
    assert_eq!(view.result, vec![item(Some("open"), "q", 1, 0)]);
    assert!(!view.loading);

    let view = sync.sync("closed", &Deps::new(), "q".to_string()).expect("switch");
    assert!(view.result.is_empty());
    assert_eq!(view.total_pages, None);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(sync.view().expect("view").loading);

    sync.settled().await;
    let view = sync.view().expect("view");
    assert_eq!(view.result, vec![item(Some("closed"), "q", 1, 0)]);
    assert!(!view.loading);

    let keys: Vec<Option<String>> = source.requests().into_iter().map(|r| r.key).collect();
    assert_eq!(keys, vec![Some("open".to_string()), Some("closed".to_string())]);
}

#[tokio::test]
async fn mapped_same_key_and_args_does_not_refetch() {
    let (source, mut sync) = mapped_setup(Some(3));

    sync.sync("open", &Deps::new(), "q".to_string()).expect("sync");
    sync.sync("open", &Deps::new(), "q".to_string()).expect("sync");
    sync.settled().await;

    assert_eq!(source.request_count(), 1);
}

#[tokio::test]
async fn mapped_fetch_more_only_extends_selected_key() {
    let (source, mut sync) = mapped_setup(Some(3));
    sync.sync("a", &Deps::new(), "q".to_string()).expect("sync");
    sync.settled().await;
    sync.sync("b", &Deps::new(), "q".to_string()).expect("sync");
    sync.settled().await;

    sync.view()
        .expect("view")
        .fetch_more()
        .await
        .expect("fetch_more");

    let view = sync.view().expect("view");
    assert_eq!(
        view.result,
        vec![item(Some("b"), "q", 1, 0), item(Some("b"), "q", 2, 0)]
    );

    sync.sync("a", &Deps::new(), "q".to_string()).expect("back to a");
    sync.settled().await;
    assert_eq!(
        sync.view().expect("view").result,
        vec![item(Some("a"), "q", 1, 0)]
    );
    assert_eq!(source.request_count(), 4);
}

#[tokio::test]
async fn mapped_loading_ignores_previous_key_flags() {
    let (source, mut sync) = mapped_setup(Some(3));
    source.delay_for("slow", 40);

    sync.sync("a", &Deps::new(), "slow".to_string()).expect("sync");
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(sync.view().expect("view").loading);

    let view = sync.sync("b", &Deps::new(), "fast".to_string()).expect("switch");
    assert!(!view.loading);
    assert!(view.result.is_empty());

    sync.settled().await;
    let view = sync.view().expect("view");
    assert!(!view.loading);
    assert_eq!(view.result, vec![item(Some("b"), "fast", 1, 0)]);
    assert!(view.error.is_none());
}
