//! Remote-fetch collaborator contract and fetch errors.
//!
//! The [`PageSource`] trait is the orchestrator's only view of the network:
//! a capability to request the first page, or the page adjacent to a known
//! cursor, and receive an ordered batch (possibly empty) or a failure with
//! a cause. Retries, backoff, and timeouts are deliberately NOT part of the
//! contract — retry bookkeeping lives in the runtime's request tracker, and
//! transport-level timeouts are the implementation's own concern.

use crate::item::{Cursor, PageBatch};
use std::fmt;
use std::future::Future;
use thiserror::Error;

/// Errors surfaced by a fetch attempt.
///
/// `Clone` because the tracker retains the cause of a failed request until
/// the request is retried or superseded, while observers may read it
/// concurrently.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The remote fetch collaborator reported an error.
    ///
    /// Recoverable: the tracker records the cause and keeps a retry action
    /// for an external trigger to re-run.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The boundary item carries no extractable cursor.
    ///
    /// A precondition violation by the upstream data, not a network fault:
    /// the fetch is never attempted.
    #[error("item at list boundary has no cursor to page from")]
    MissingCursor,

    /// Persisting a successfully fetched batch failed.
    ///
    /// Surfaced through the same retry path as transport failures; the
    /// retry re-fetches and re-inserts, which is safe because the storage
    /// collaborator's insert is an idempotent upsert.
    #[error("storage write failed: {0}")]
    Storage(String),
}

impl FetchError {
    /// Wrap an underlying transport error's rendering as a fetch failure.
    #[must_use]
    pub fn transport(cause: impl fmt::Display) -> Self {
        Self::Transport(cause.to_string())
    }
}

/// The remote fetch collaborator.
///
/// Each operation resolves asynchronously to either an ordered batch of
/// items (possibly empty — end of feed) or a [`FetchError`] carrying the
/// underlying cause. Implementations must treat an absent response body as
/// an empty batch, not an error.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: fetches are launched from the
/// caller's thread but resolve on the async runtime, and the same source
/// is shared by every retry of a failed request.
pub trait PageSource: Send + Sync {
    /// The paginated domain unit this source produces.
    type Item;

    /// Fetch the first page of the feed.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] when the remote call fails.
    fn fetch_initial(&self) -> impl Future<Output = Result<PageBatch<Self::Item>, FetchError>> + Send;

    /// Fetch the page after the given cursor (appending to the list tail).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] when the remote call fails.
    fn fetch_after(
        &self,
        cursor: Cursor,
    ) -> impl Future<Output = Result<PageBatch<Self::Item>, FetchError>> + Send;

    /// Fetch the page before the given cursor (prepending to the list head).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] when the remote call fails.
    fn fetch_before(
        &self,
        cursor: Cursor,
    ) -> impl Future<Output = Result<PageBatch<Self::Item>, FetchError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_constructor_renders_cause() {
        let err = FetchError::transport("connection reset by peer");
        assert_eq!(
            err.to_string(),
            "transport failure: connection reset by peer"
        );
    }

    #[test]
    fn missing_cursor_is_not_a_transport_failure() {
        assert_ne!(
            FetchError::MissingCursor,
            FetchError::transport("missing cursor")
        );
    }
}
