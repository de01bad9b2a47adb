//! Local persistence collaborator contract.

use std::future::Future;
use thiserror::Error;

/// Storage-side write failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("insert failed: {0}")]
pub struct InsertError(String);

impl InsertError {
    /// Create an insert error from a storage-side cause.
    #[must_use]
    pub fn new(cause: impl Into<String>) -> Self {
        Self(cause.into())
    }
}

/// The local storage collaborator.
///
/// Accepts batches of fetched items for insertion into the on-device cache
/// that backs the visible list. The orchestrator holds no long-term cache
/// of its own; a fetched batch is handed over here and forgotten.
///
/// # Contract
///
/// - `insert` is an **idempotent upsert by item identity**. This is a hard
///   requirement: completion is optimistic, so a rapid follow-up boundary
///   signal can re-fetch a page whose previous insert has not landed yet,
///   and the duplicate rows must collapse.
/// - An empty batch is a no-op, not an error.
/// - Implementations run off the triggering thread; the runtime serializes
///   insert calls through a single worker to preserve insertion order.
pub trait ItemStore: Send + Sync {
    /// The paginated domain unit this store accepts.
    type Item;

    /// Upsert a batch of items into the local store.
    ///
    /// # Errors
    ///
    /// Returns [`InsertError`] when the storage backend rejects the write.
    fn insert(
        &self,
        items: Vec<Self::Item>,
    ) -> impl Future<Output = Result<(), InsertError>> + Send;
}
