//! Integration tests for the boundary-fetch coordinator.
//!
//! Drives the coordinator with mock collaborators on a current-thread
//! runtime: boundary signals are issued synchronously, then the runtime is
//! yielded so spawned fetches and the persistence worker can run.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use feedpager_core::{Cursor, FetchError, LoaderState, RequestStatus, RequestType};
use feedpager_runtime::BoundaryFetchCoordinator;
use feedpager_testing::{FetchCall, MockItemStore, MockPageSource, TestPost, init_tracing};
use std::time::Duration;

/// Let spawned fetch tasks and the persistence worker run to completion.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

fn coordinator_with(
    source: &MockPageSource,
    store: &MockItemStore,
) -> BoundaryFetchCoordinator<TestPost, MockPageSource> {
    init_tracing();
    BoundaryFetchCoordinator::new(source.clone(), store.clone())
}

#[tokio::test]
async fn first_load_with_empty_feed_completes_cleanly() {
    let source = MockPageSource::new();
    let store = MockItemStore::new();
    let coordinator = coordinator_with(&source, &store);
    let loader = coordinator.subscribe();

    coordinator.on_list_empty();
    assert_eq!(*loader.borrow(), LoaderState::Loading);

    settle().await;

    // An empty batch is a valid success: it still flows through the
    // persistence worker and returns the slot to idle.
    assert_eq!(*loader.borrow(), LoaderState::Done);
    assert_eq!(source.calls(), vec![FetchCall::Initial]);
    assert_eq!(store.insert_count(), 1);
    assert!(store.inserted_batches()[0].is_empty());
    assert_eq!(
        coordinator.request_status(RequestType::Initial),
        RequestStatus::Idle
    );
}

#[tokio::test]
async fn first_load_persists_fetched_items_in_feed_order() {
    let source = MockPageSource::new();
    source.push_batch(vec![TestPost::new("a"), TestPost::new("b")]);
    let store = MockItemStore::new();
    let coordinator = coordinator_with(&source, &store);

    coordinator.on_list_empty();
    settle().await;

    let batches = store.inserted_batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(
        batches[0].iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
        vec!["a", "b"]
    );
}

#[tokio::test]
async fn end_reached_pages_after_the_tail_cursor() {
    let source = MockPageSource::new();
    source.push_batch(vec![TestPost::new("next")]);
    let store = MockItemStore::new();
    let coordinator = coordinator_with(&source, &store);

    coordinator.on_end_reached(&TestPost::new("tail"));
    settle().await;

    assert_eq!(source.calls(), vec![FetchCall::After(Cursor::new("t3_tail"))]);
    assert_eq!(store.inserted_batches()[0][0].id, "next");
    assert_eq!(
        coordinator.request_status(RequestType::After),
        RequestStatus::Idle
    );
}

#[tokio::test]
async fn start_reached_pages_before_the_head_cursor() {
    let source = MockPageSource::new();
    let store = MockItemStore::new();
    let coordinator = coordinator_with(&source, &store);

    coordinator.on_start_reached(&TestPost::new("head"));
    settle().await;

    assert_eq!(
        source.calls(),
        vec![FetchCall::Before(Cursor::new("t3_head"))]
    );
    assert_eq!(
        coordinator.request_status(RequestType::Before),
        RequestStatus::Idle
    );
}

#[tokio::test]
async fn transport_failure_publishes_error_and_retains_the_cause() {
    let source = MockPageSource::new();
    source.push_error(FetchError::transport("503 service unavailable"));
    let store = MockItemStore::new();
    let coordinator = coordinator_with(&source, &store);
    let loader = coordinator.subscribe();

    coordinator.on_end_reached(&TestPost::new("tail"));
    assert_eq!(*loader.borrow(), LoaderState::Loading);

    settle().await;

    assert_eq!(*loader.borrow(), LoaderState::Error);
    assert_eq!(
        coordinator.request_status(RequestType::After),
        RequestStatus::Failed
    );
    assert_eq!(
        coordinator.last_failure(RequestType::After),
        Some(FetchError::transport("503 service unavailable"))
    );
    assert_eq!(store.insert_count(), 0);
}

#[tokio::test]
async fn missing_cursor_fails_fast_without_touching_the_source() {
    let source = MockPageSource::new();
    let store = MockItemStore::new();
    let coordinator = coordinator_with(&source, &store);
    let loader = coordinator.subscribe();

    coordinator.on_end_reached(&TestPost::without_cursor("tail"));
    settle().await;

    assert_eq!(source.call_count(), 0);
    assert_eq!(*loader.borrow(), LoaderState::Error);
    // No retry state is created: retrying a cursor-less item cannot succeed.
    assert_eq!(
        coordinator.request_status(RequestType::After),
        RequestStatus::Idle
    );
}

#[tokio::test]
async fn duplicate_end_signals_while_in_flight_fetch_once() {
    let source = MockPageSource::gated();
    let store = MockItemStore::new();
    let coordinator = coordinator_with(&source, &store);

    coordinator.on_end_reached(&TestPost::new("a"));
    settle().await;
    assert_eq!(
        coordinator.request_status(RequestType::After),
        RequestStatus::Running
    );

    // A second boundary signal for the same edge while the first fetch is
    // still pending is a no-op with respect to network traffic.
    coordinator.on_end_reached(&TestPost::new("b"));
    settle().await;
    assert_eq!(source.call_count(), 1);

    source.release(1);
    settle().await;

    assert_eq!(source.calls(), vec![FetchCall::After(Cursor::new("t3_a"))]);
    assert_eq!(store.insert_count(), 1);
    assert_eq!(
        coordinator.request_status(RequestType::After),
        RequestStatus::Idle
    );
}

#[tokio::test]
async fn distinct_request_types_fetch_concurrently() {
    let source = MockPageSource::gated();
    let store = MockItemStore::new();
    let coordinator = coordinator_with(&source, &store);

    coordinator.on_list_empty();
    coordinator.on_end_reached(&TestPost::new("tail"));
    settle().await;

    // Both edges are in flight at once; only same-type signals dedup.
    assert_eq!(source.call_count(), 2);

    source.release(2);
    settle().await;
    assert_eq!(store.insert_count(), 2);
}

#[tokio::test]
async fn retry_relaunches_the_failed_fetch_with_the_same_cursor() {
    let source = MockPageSource::new();
    source.push_error(FetchError::transport("timeout"));
    let store = MockItemStore::new();
    let coordinator = coordinator_with(&source, &store);
    let loader = coordinator.subscribe();

    coordinator.on_end_reached(&TestPost::new("tail"));
    settle().await;
    assert_eq!(
        coordinator.request_status(RequestType::After),
        RequestStatus::Failed
    );

    // The scripted queue is now empty, so the retried fetch succeeds.
    coordinator.retry_all_failed();
    assert_eq!(*loader.borrow(), LoaderState::Loading);
    settle().await;

    assert_eq!(
        source.calls(),
        vec![
            FetchCall::After(Cursor::new("t3_tail")),
            FetchCall::After(Cursor::new("t3_tail")),
        ]
    );
    assert_eq!(*loader.borrow(), LoaderState::Done);
    assert_eq!(
        coordinator.request_status(RequestType::After),
        RequestStatus::Idle
    );
}

#[tokio::test]
async fn retry_with_nothing_failed_is_a_noop() {
    let source = MockPageSource::new();
    let store = MockItemStore::new();
    let coordinator = coordinator_with(&source, &store);
    let loader = coordinator.subscribe();

    coordinator.retry_all_failed();
    settle().await;

    assert_eq!(*loader.borrow(), LoaderState::Done);
    assert_eq!(source.call_count(), 0);
}

#[tokio::test]
async fn storage_failure_leaves_the_request_retryable() {
    let source = MockPageSource::new();
    source.push_batch(vec![TestPost::new("a")]);
    let store = MockItemStore::new();
    store.fail_next_insert();
    let coordinator = coordinator_with(&source, &store);
    let loader = coordinator.subscribe();

    coordinator.on_list_empty();
    settle().await;

    // Completion is optimistic: the fetch itself succeeded, so `Done` was
    // published even though the insert was rejected afterwards.
    assert_eq!(*loader.borrow(), LoaderState::Done);
    assert_eq!(
        coordinator.request_status(RequestType::Initial),
        RequestStatus::Failed
    );
    assert!(matches!(
        coordinator.last_failure(RequestType::Initial),
        Some(FetchError::Storage(_))
    ));

    // The retry re-fetches and re-inserts; the upsert contract makes the
    // duplicate write safe.
    source.push_batch(vec![TestPost::new("a")]);
    coordinator.retry_all_failed();
    settle().await;

    assert_eq!(
        coordinator.request_status(RequestType::Initial),
        RequestStatus::Idle
    );
    assert_eq!(store.insert_count(), 1);
}

#[tokio::test]
async fn back_to_back_fetches_persist_in_completion_order() {
    let source = MockPageSource::new();
    source.push_batch(vec![TestPost::new("page1")]);
    source.push_batch(vec![TestPost::new("page2")]);
    let store = MockItemStore::new();
    let coordinator = coordinator_with(&source, &store);

    coordinator.on_list_empty();
    settle().await;
    coordinator.on_end_reached(&TestPost::new("page1"));
    settle().await;

    let batches = store.inserted_batches();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0][0].id, "page1");
    assert_eq!(batches[1][0].id, "page2");
}
