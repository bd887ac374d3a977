//! Tests for `EntitySync<T>` over `MemoryStore`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use page_sync::{
    reactive::Deps,
    store::MemoryStore,
    sync::{EntitySync, SyncOptions},
    FetchError,
};

use crate::common::MockEntitySource;

fn setup() -> (Arc<MockEntitySource>, Arc<MemoryStore<String>>, EntitySync<String>) {
    let source = Arc::new(MockEntitySource::new());
    let store: Arc<MemoryStore<String>> = Arc::new(MemoryStore::new(source.clone()));
    let sync = EntitySync::new(store.clone(), SyncOptions::default());
    (source, store, sync)
}

#[tokio::test]
async fn sync_fetches_and_publishes_entity() {
    let (source, _store, mut sync) = setup();
    source.insert("u1", "Alice");

    let snapshot = sync.sync("u1", &Deps::new());
    assert!(snapshot.loading);
    assert_eq!(snapshot.result, None);

    sync.settled().await;
    let snapshot = sync.snapshot();
    assert!(!snapshot.loading);
    assert_eq!(snapshot.result, Some("Alice".to_string()));
    assert!(snapshot.error.is_none());
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn loading_stays_true_until_fetch_settles() {
    let (source, _store, mut sync) = setup();
    source.insert("u1", "Alice");
    source.delay(30);

    sync.sync("u1", &Deps::new());
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    assert!(sync.loading().get());

    sync.settled().await;
    assert!(!sync.loading().get());
}

#[tokio::test]
async fn one_fetch_per_id_and_deps_change() {
    let (source, _store, mut sync) = setup();
    source.insert("u1", "Alice");
    source.insert("u2", "Bob");

    sync.sync("u1", &Deps::new().with(1));
    sync.sync("u1", &Deps::new().with(1));
    sync.settled().await;
    assert_eq!(source.calls(), 1);

    sync.sync("u1", &Deps::new().with(2));
    sync.settled().await;
    assert_eq!(source.calls(), 2);

    sync.sync("u2", &Deps::new().with(2));
    sync.settled().await;
    assert_eq!(source.calls(), 3);
    assert_eq!(sync.fetch_count(), 3);
    assert_eq!(sync.snapshot().result, Some("Bob".to_string()));
}

#[tokio::test]
async fn failure_is_captured_not_returned() {
    let (source, _store, mut sync) = setup();
    source.fail_with(Some("offline"));

    sync.sync("u1", &Deps::new());
    sync.settled().await;

    let snapshot = sync.snapshot();
    assert!(!snapshot.loading);
    assert_eq!(snapshot.result, None);
    assert_eq!(snapshot.error, Some(FetchError::failed("offline")));
}

#[tokio::test]
async fn later_success_clears_error() {
    let (source, _store, mut sync) = setup();
    source.insert("u1", "Alice");
    source.fail_with(Some("offline"));
    sync.sync("u1", &Deps::new().with("try-1"));
    sync.settled().await;
    assert!(sync.snapshot().error.is_some());

    source.fail_with(None);
    sync.sync("u1", &Deps::new().with("try-2"));
    sync.settled().await;

    let snapshot = sync.snapshot();
    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.result, Some("Alice".to_string()));
}

#[tokio::test]
async fn primed_entity_is_visible_before_fetch_completes() {
    let (source, store, mut sync) = setup();
    source.insert("u1", "fresh");
    source.delay(20);
    store.prime("u1", "cached".to_string());

    let snapshot = sync.sync("u1", &Deps::new());
    assert_eq!(snapshot.result, Some("cached".to_string()));
    assert!(snapshot.loading);

    sync.settled().await;
    assert_eq!(sync.snapshot().result, Some("fresh".to_string()));
}

#[tokio::test]
async fn missing_entity_yields_none_without_error() {
    let (_source, _store, mut sync) = setup();

    sync.sync("ghost", &Deps::new());
    sync.settled().await;

    let snapshot = sync.snapshot();
    assert_eq!(snapshot.result, None);
    assert!(snapshot.error.is_none());
}

#[tokio::test]
async fn subscribers_see_loading_and_result_changes() {
    let (source, _store, mut sync) = setup();
    source.insert("u1", "Alice");
    let notified = Arc::new(AtomicUsize::new(0));
    {
        let notified = Arc::clone(&notified);
        let _ = sync.subscribe(move || {
            notified.fetch_add(1, Ordering::SeqCst);
        });
    }

    sync.sync("u1", &Deps::new());
    assert_eq!(notified.load(Ordering::SeqCst), 1);

    sync.settled().await;
    // entity published, then loading lowered
    assert_eq!(notified.load(Ordering::SeqCst), 3);
}
