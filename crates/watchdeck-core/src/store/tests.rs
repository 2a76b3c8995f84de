use super::*;
use crate::testing::{entry, session, MockTable};
use watchdeck_models::MediaType;

async fn ready_store(table: Arc<crate::testing::MockTable>) -> WatchlistStore {
    let mut store = WatchlistStore::new(table);
    store.begin_session(session("user-1")).await;
    assert_eq!(store.phase(), SyncPhase::Ready);
    store
}

#[tokio::test]
async fn test_unauthenticated_store_is_empty_and_idle() {
    let table = MockTable::new();
    let store = WatchlistStore::new(table.clone());

    assert_eq!(store.phase(), SyncPhase::Unauthenticated);
    assert!(store.is_empty());
    assert_eq!(table.fetch_calls(), 0);
}

#[tokio::test]
async fn test_begin_session_loads_entries() {
    let table = MockTable::with_rows(vec![
        entry("27205", MediaType::Movie, "Inception"),
        entry("1399", MediaType::Tv, "Game of Thrones"),
    ]);
    let store = ready_store(table.clone()).await;

    assert_eq!(store.len(), 2);
    assert_eq!(table.fetch_calls(), 1);
    assert!(store.last_error().is_none());
}

#[tokio::test]
async fn test_begin_session_failure_parks_in_error() {
    let table = MockTable::with_rows(vec![entry("27205", MediaType::Movie, "Inception")]);
    table.set_fail_fetches(true);

    let mut store = WatchlistStore::new(table.clone());
    store.begin_session(session("user-1")).await;

    assert_eq!(store.phase(), SyncPhase::Error);
    assert!(store.is_empty());
    assert!(matches!(
        store.last_error(),
        Some(WatchlistError::RemoteRead(_))
    ));

    // No automatic retry
    assert_eq!(table.fetch_calls(), 1);
}

#[tokio::test]
async fn test_add_is_idempotent() {
    let table = MockTable::new();
    let mut store = ready_store(table.clone()).await;

    assert!(store.add_to_watchlist("27205", MediaType::Movie, "Inception", None).await);
    assert!(store.add_to_watchlist("27205", MediaType::Movie, "Inception", None).await);

    assert_eq!(store.len(), 1);
    // Second add must not issue a second remote insert
    assert_eq!(table.insert_calls(), 1);
}

#[tokio::test]
async fn test_composite_uniqueness_over_mixed_sequences() {
    let table = MockTable::new();
    let mut store = ready_store(table.clone()).await;

    assert!(store.add_to_watchlist("603", MediaType::Movie, "The Matrix", None).await);
    assert!(store.add_to_watchlist("603", MediaType::Tv, "The Matrix (TV)", None).await);
    assert!(store.add_to_watchlist("603", MediaType::Movie, "The Matrix", None).await);
    assert!(store.remove_from_watchlist("603", MediaType::Tv).await);
    assert!(store.add_to_watchlist("603", MediaType::Tv, "The Matrix (TV)", None).await);

    // Same media_id under both types is two distinct keys, never duplicated
    assert_eq!(store.len(), 2);
    let keys: std::collections::HashSet<_> = store.entries().iter().map(|e| e.key()).collect();
    assert_eq!(keys.len(), store.len());
}

#[tokio::test]
async fn test_unauthenticated_operations_are_rejected() {
    let table = MockTable::new();
    let mut store = WatchlistStore::new(table.clone());

    assert!(!store.add_to_watchlist("27205", MediaType::Movie, "Inception", None).await);
    assert_eq!(store.last_error(), Some(&WatchlistError::Unauthenticated));

    assert!(!store.remove_from_watchlist("27205", MediaType::Movie).await);
    assert_eq!(store.last_error(), Some(&WatchlistError::Unauthenticated));

    assert!(store.is_empty());
    assert_eq!(table.insert_calls(), 0);
    assert_eq!(table.delete_calls(), 0);
}

#[tokio::test]
async fn test_failed_insert_leaves_no_phantom_entry() {
    let table = MockTable::with_rows(vec![entry("1399", MediaType::Tv, "Game of Thrones")]);
    let mut store = ready_store(table.clone()).await;
    let before = store.entries().to_vec();

    table.set_fail_writes(true);
    assert!(!store.add_to_watchlist("27205", MediaType::Movie, "Inception", None).await);

    assert_eq!(store.entries(), before.as_slice());
    assert!(!store.is_in_watchlist("27205", MediaType::Movie));
    assert_eq!(
        store.last_error(),
        Some(&WatchlistError::RemoteWrite("insert rejected".to_string()))
    );
}

#[tokio::test]
async fn test_failed_delete_leaves_local_state_unchanged() {
    let table = MockTable::with_rows(vec![entry("1399", MediaType::Tv, "Game of Thrones")]);
    let mut store = ready_store(table.clone()).await;

    table.set_fail_writes(true);
    assert!(!store.remove_from_watchlist("1399", MediaType::Tv).await);

    assert!(store.is_in_watchlist("1399", MediaType::Tv));
    assert_eq!(
        store.last_error(),
        Some(&WatchlistError::RemoteWrite("delete rejected".to_string()))
    );
}

#[tokio::test]
async fn test_refresh_replaces_state_wholesale() {
    let table = MockTable::with_rows(vec![entry("27205", MediaType::Movie, "Inception")]);
    let mut store = ready_store(table.clone()).await;
    assert_eq!(store.len(), 1);

    // Remote diverged arbitrarily: grew to five unrelated rows
    table.set_rows(vec![
        entry("1", MediaType::Movie, "A"),
        entry("2", MediaType::Movie, "B"),
        entry("3", MediaType::Tv, "C"),
        entry("4", MediaType::Tv, "D"),
        entry("5", MediaType::Movie, "E"),
    ]);
    assert!(store.refresh().await);
    assert_eq!(store.len(), 5);
    assert!(!store.is_in_watchlist("27205", MediaType::Movie));

    // And shrank to nothing
    table.set_rows(Vec::new());
    assert!(store.refresh().await);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_refresh_failure_keeps_last_known_entries() {
    let table = MockTable::with_rows(vec![entry("27205", MediaType::Movie, "Inception")]);
    let mut store = ready_store(table.clone()).await;

    table.set_fail_fetches(true);
    assert!(!store.refresh().await);

    assert_eq!(store.len(), 1);
    assert!(store.is_in_watchlist("27205", MediaType::Movie));
    assert!(matches!(
        store.last_error(),
        Some(WatchlistError::RemoteRead(_))
    ));
}

#[tokio::test]
async fn test_successful_operation_clears_sticky_error() {
    let table = MockTable::new();
    let mut store = ready_store(table.clone()).await;

    table.set_fail_writes(true);
    assert!(!store.add_to_watchlist("27205", MediaType::Movie, "Inception", None).await);
    assert!(store.last_error().is_some());

    table.set_fail_writes(false);
    assert!(store.add_to_watchlist("27205", MediaType::Movie, "Inception", None).await);
    assert!(store.last_error().is_none());
}

#[tokio::test]
async fn test_end_session_clears_everything() {
    let table = MockTable::with_rows(vec![entry("27205", MediaType::Movie, "Inception")]);
    let mut store = ready_store(table.clone()).await;

    store.end_session();

    assert_eq!(store.phase(), SyncPhase::Unauthenticated);
    assert!(store.is_empty());
    assert!(store.last_error().is_none());
    assert!(store.user_id().is_none());
}

#[tokio::test]
async fn test_duplicate_remote_rows_are_collapsed_on_load() {
    let table = MockTable::with_rows(vec![
        entry("27205", MediaType::Movie, "Inception"),
        entry("27205", MediaType::Movie, "Inception (dup)"),
    ]);
    let store = ready_store(table).await;

    assert_eq!(store.len(), 1);
    assert_eq!(store.entries()[0].title, "Inception");
}
