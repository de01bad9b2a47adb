//! Mock collaborators for orchestrator tests.
//!
//! Provides deterministic stand-ins for the two external capabilities the
//! coordinator consumes:
//! - [`MockPageSource`]: scripted fetch responses, call recording, and an
//!   optional gate for holding fetches in flight
//! - [`MockItemStore`]: records inserted batches, can be armed to fail
//!
//! Plus [`TestPost`], a minimal post-like item implementing [`PageItem`].

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity

use chrono::{DateTime, TimeZone, Utc};
use feedpager_core::{Cursor, FetchError, InsertError, ItemStore, PageBatch, PageItem, PageSource};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// A minimal post-like paginated item for tests.
///
/// Carries an identity, a display title, an optional paging key (absent for
/// the malformed-record case), and a timestamp.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestPost {
    /// Stable identity the store upserts by.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Paging key; `None` models a record with no extractable cursor.
    pub key: Option<Cursor>,
    /// Publication time.
    pub created_at: DateTime<Utc>,
}

impl TestPost {
    /// A post whose cursor is derived from its id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            key: Some(Cursor::new(format!("t3_{id}"))),
            title: format!("post {id}"),
            created_at: test_epoch(),
            id,
        }
    }

    /// A malformed post carrying no extractable cursor.
    #[must_use]
    pub fn without_cursor(id: impl Into<String>) -> Self {
        let mut post = Self::new(id);
        post.key = None;
        post
    }
}

impl PageItem for TestPost {
    fn cursor(&self) -> Option<Cursor> {
        self.key.clone()
    }
}

/// Fixed timestamp for deterministic tests (2025-01-01 00:00:00 UTC).
///
/// # Panics
///
/// Panics if the hardcoded timestamp is rejected, which cannot happen.
#[must_use]
pub fn test_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

/// One recorded call against a [`MockPageSource`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchCall {
    /// `fetch_initial` was invoked.
    Initial,
    /// `fetch_after` was invoked with this cursor.
    After(Cursor),
    /// `fetch_before` was invoked with this cursor.
    Before(Cursor),
}

/// Scripted remote source for tests.
///
/// Responses are served from a single FIFO queue regardless of fetch kind;
/// when the queue is empty, fetches succeed with an empty batch (end of
/// feed). Every call is recorded for assertion.
///
/// A source built with [`gated`](Self::gated) parks each fetch after
/// recording it until the test calls [`release`](Self::release), which is
/// how dedup-while-in-flight scenarios are driven deterministically.
///
/// # Example
///
/// ```ignore
/// let source = MockPageSource::new();
/// source.push_batch(vec![TestPost::new("a")]);
///
/// let batch = source.fetch_initial().await.unwrap();
/// assert_eq!(batch.len(), 1);
/// assert_eq!(source.calls(), vec![FetchCall::Initial]);
/// ```
#[derive(Clone)]
pub struct MockPageSource {
    responses: Arc<Mutex<VecDeque<Result<PageBatch<TestPost>, FetchError>>>>,
    calls: Arc<Mutex<Vec<FetchCall>>>,
    gate: Option<Arc<Semaphore>>,
}

impl MockPageSource {
    /// A source that answers immediately.
    #[must_use]
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    /// A source that parks every fetch (after recording it) until
    /// [`release`](Self::release) grants a permit.
    #[must_use]
    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::new()
        }
    }

    /// Let `n` parked fetches proceed. No-op on an ungated source.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Script the next response as a successful batch.
    pub fn push_batch(&self, items: Vec<TestPost>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(PageBatch::new(items)));
    }

    /// Script the next response as a failure.
    pub fn push_error(&self, error: FetchError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls made so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    async fn respond(&self, call: FetchCall) -> Result<PageBatch<TestPost>, FetchError> {
        self.calls.lock().unwrap().push(call);
        if let Some(gate) = &self.gate {
            match gate.acquire().await {
                Ok(permit) => permit.forget(),
                Err(_) => return Err(FetchError::transport("mock gate closed")),
            }
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(PageBatch::empty()))
    }
}

impl Default for MockPageSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSource for MockPageSource {
    type Item = TestPost;

    async fn fetch_initial(&self) -> Result<PageBatch<TestPost>, FetchError> {
        self.respond(FetchCall::Initial).await
    }

    async fn fetch_after(&self, cursor: Cursor) -> Result<PageBatch<TestPost>, FetchError> {
        self.respond(FetchCall::After(cursor)).await
    }

    async fn fetch_before(&self, cursor: Cursor) -> Result<PageBatch<TestPost>, FetchError> {
        self.respond(FetchCall::Before(cursor)).await
    }
}

/// Recording in-memory store for tests.
///
/// Keeps every inserted batch in arrival order. Can be armed to reject the
/// next insert, for exercising the storage-failure path.
#[derive(Clone)]
pub struct MockItemStore {
    batches: Arc<Mutex<Vec<Vec<TestPost>>>>,
    fail_next: Arc<AtomicBool>,
}

impl MockItemStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            batches: Arc::new(Mutex::new(Vec::new())),
            fail_next: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Arm the store to reject the next insert.
    pub fn fail_next_insert(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Every inserted batch so far, in insertion order.
    #[must_use]
    pub fn inserted_batches(&self) -> Vec<Vec<TestPost>> {
        self.batches.lock().unwrap().clone()
    }

    /// Number of insert calls observed.
    #[must_use]
    pub fn insert_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }
}

impl Default for MockItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemStore for MockItemStore {
    type Item = TestPost;

    async fn insert(&self, items: Vec<TestPost>) -> Result<(), InsertError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(InsertError::new("injected storage failure"));
        }
        self.batches.lock().unwrap().push(items);
        Ok(())
    }
}
