use std::sync::Arc;

use buddydocs::{
    AppState, DocsError, DocumentDraft, DocumentQueryService, DocumentStore, DocumentType,
};
use chrono::{Duration, Utc};
use tempfile::TempDir;

fn setup() -> (TempDir, Arc<DocumentStore>, DocumentQueryService) {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(DocumentStore::new(dir.path().join("store")));
    let service = DocumentQueryService::new(Arc::clone(&store));
    (dir, store, service)
}

#[tokio::test]
async fn list_orders_deadline_then_pinned_then_recent() {
    let (_dir, store, service) = setup();

    let c = store
        .create(DocumentDraft::new("C", DocumentType::Document))
        .await
        .unwrap();
    let b = store
        .create(DocumentDraft::new("B", DocumentType::Document).pinned(true))
        .await
        .unwrap();
    let a = store
        .create(
            DocumentDraft::new("A", DocumentType::Document)
                .with_deadline(Utc::now() + Duration::days(1)),
        )
        .await
        .unwrap();
    // Touch C so it is the most recently modified.
    store.save(c, "C", "<p>fresh</p>").await.unwrap();

    let listed: Vec<_> = service
        .list("all", "")
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(listed, vec![a, b, c]);
}

#[tokio::test]
async fn list_filters_and_searches_through_the_store() {
    let (_dir, store, service) = setup();

    let wiki = store
        .create(DocumentDraft::new("Team wiki", DocumentType::Wiki))
        .await
        .unwrap();
    store
        .create(DocumentDraft::new("Shopping", DocumentType::List))
        .await
        .unwrap();
    let notes = store
        .create(DocumentDraft::new("Notes", DocumentType::Document).with_content("the quick fox"))
        .await
        .unwrap();

    let wikis = service.list("wiki", "").await.unwrap();
    assert_eq!(wikis.len(), 1);
    assert_eq!(wikis[0].id, wiki);

    let found = service.list("all", "quick").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, notes);

    assert!(service.list("all", "zzz").await.unwrap().is_empty());
}

#[tokio::test]
async fn list_is_stable_across_calls() {
    let (_dir, store, service) = setup();
    for i in 0..5 {
        store
            .create(DocumentDraft::new(format!("Doc {}", i), DocumentType::Fiction))
            .await
            .unwrap();
    }

    let first = service.list("all", "").await.unwrap();
    let second = service.list("all", "").await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn app_state_caches_until_invalidated() {
    let (_dir, store, service) = setup();
    store
        .create(DocumentDraft::new("First", DocumentType::Wiki))
        .await
        .unwrap();

    let mut state = AppState::new().with_filter("wiki");
    assert!(state.is_stale());
    assert_eq!(state.visible(&service).await.unwrap().len(), 1);
    assert!(!state.is_stale());

    let second = store
        .create(DocumentDraft::new("Second", DocumentType::Wiki))
        .await
        .unwrap();
    // Still the cached listing until the mutation is signalled.
    assert_eq!(state.visible(&service).await.unwrap().len(), 1);

    state.invalidate();
    state.open(second);
    let visible = state.visible(&service).await.unwrap();
    assert_eq!(visible.len(), 2);
    assert_eq!(state.current(), Some(second));

    let mut state = state.with_query("first");
    assert_eq!(state.visible(&service).await.unwrap().len(), 1);
}

#[tokio::test]
async fn list_surfaces_storage_failures() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("blocked");
    std::fs::write(&root, "file in the way").unwrap();
    let service = DocumentQueryService::new(Arc::new(DocumentStore::new(root)));

    let err = service.list("all", "").await.unwrap_err();
    assert!(matches!(err, DocsError::StorageUnavailable { .. }));
    assert!(err.is_retryable());
}
