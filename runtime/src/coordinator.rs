//! Boundary-event driven fetch coordination.
//!
//! The [`BoundaryFetchCoordinator`] translates "the cached list ran out of
//! data at this edge" signals into gated remote fetches: it consults the
//! [`RequestTracker`] so the same edge is never fetched twice concurrently,
//! hands successful batches to the persistence worker, and broadcasts a
//! coarse [`LoaderState`] phase through a last-write-wins watch channel.
//!
//! Completion is optimistic: `Done` is published as soon as the fetch
//! resolves, without waiting for the batch to land in the store. The
//! storage collaborator's idempotent-upsert contract is what makes the
//! resulting re-fetch window safe.

use crate::persist::PersistQueue;
use crate::tracker::RequestTracker;
use feedpager_core::{
    FetchError, ItemStore, LoaderState, PageBatch, PageItem, PageSource, RequestStatus,
    RequestType,
};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// Reacts to list-boundary events by issuing deduplicated, retryable
/// remote fetches and persisting their results.
///
/// Generic over the paginated item `T` and the remote source `F`; the
/// storage collaborator is consumed at construction by the persistence
/// worker. Cloning shares the source, tracker, worker, and loader channel.
///
/// No operation blocks the caller: fetches run in spawned tasks, duplicate
/// boundary signals return immediately, and there is no cancellation or
/// timeout in this layer (a transport-level timeout is the source's
/// concern). Every entry point that launches work must be called from
/// within a Tokio runtime.
///
/// # Example
///
/// ```ignore
/// let coordinator = BoundaryFetchCoordinator::new(api, db);
/// let mut loader = coordinator.subscribe();
///
/// // Wire these to the consuming list's boundary callbacks:
/// coordinator.on_list_empty();
/// coordinator.on_end_reached(&last_visible_post);
///
/// // And to a user-facing retry affordance:
/// coordinator.retry_all_failed();
/// ```
pub struct BoundaryFetchCoordinator<T, F>
where
    T: PageItem,
    F: PageSource<Item = T>,
{
    source: Arc<F>,
    tracker: RequestTracker,
    persist: PersistQueue<T>,
    loader: watch::Sender<LoaderState>,
}

impl<T, F> BoundaryFetchCoordinator<T, F>
where
    T: PageItem,
    F: PageSource<Item = T> + 'static,
{
    /// Create a coordinator around the remote source and local store.
    ///
    /// The loader channel starts at [`LoaderState::Done`] (quiescent).
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime (the persistence worker
    /// is a spawned task).
    #[must_use]
    pub fn new<S>(source: F, store: S) -> Self
    where
        S: ItemStore<Item = T> + 'static,
    {
        let (loader, _) = watch::channel(LoaderState::Done);
        Self {
            source: Arc::new(source),
            tracker: RequestTracker::new(),
            persist: PersistQueue::new(store),
            loader,
        }
    }

    /// Subscribe to loader phase updates.
    ///
    /// The channel is single-slot and last-write-wins with no replay:
    /// consumers observe the most recent known phase, not a per-request
    /// event stream.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LoaderState> {
        self.loader.subscribe()
    }

    /// The cached list has zero items and nothing is known to precede or
    /// follow them: load the first page.
    pub fn on_list_empty(&self) {
        self.trigger(RequestType::Initial, |source| async move {
            source.fetch_initial().await
        });
    }

    /// The cached list's tail is visible and exhausted: load the page
    /// after `item_at_end`.
    ///
    /// An item without an extractable cursor is a precondition violation:
    /// the failure is reported without invoking the source at all.
    pub fn on_end_reached(&self, item_at_end: &T) {
        let Some(cursor) = item_at_end.cursor() else {
            self.fail_precondition(RequestType::After);
            return;
        };
        self.trigger(RequestType::After, move |source| {
            let cursor = cursor.clone();
            async move { source.fetch_after(cursor).await }
        });
    }

    /// The cached list's head is visible and exhausted: load the page
    /// before `item_at_start`.
    ///
    /// Symmetric to [`on_end_reached`](Self::on_end_reached), for consuming
    /// lists that allow prepending.
    pub fn on_start_reached(&self, item_at_start: &T) {
        let Some(cursor) = item_at_start.cursor() else {
            self.fail_precondition(RequestType::Before);
            return;
        };
        self.trigger(RequestType::Before, move |source| {
            let cursor = cursor.clone();
            async move { source.fetch_before(cursor).await }
        });
    }

    /// Re-launch every request currently in the `Failed` state.
    ///
    /// Intended for an external user-initiated retry trigger. Publishes
    /// `Loading` when there is anything to retry; the retried attempts then
    /// publish `Done` or `Error` on their own as they complete.
    pub fn retry_all_failed(&self) {
        if !self.tracker.has_failed() {
            return;
        }
        self.publish(LoaderState::Loading);
        let retried = self.tracker.retry_all_failed();
        tracing::debug!(retried, "retrying failed requests");
    }

    /// Current tracker status for `ty`.
    #[must_use]
    pub fn request_status(&self, ty: RequestType) -> RequestStatus {
        self.tracker.status_of(ty)
    }

    /// Cause of the last failure for `ty`, while it is `Failed`.
    #[must_use]
    pub fn last_failure(&self, ty: RequestType) -> Option<FetchError> {
        self.tracker.failure_of(ty)
    }

    /// Gate a fetch on the tracker and run it.
    ///
    /// `fetch` builds a fresh future per attempt, which is what makes the
    /// stored action re-invokable by `retry_all_failed`. The spawned task
    /// hands a successful batch (empty included — end of feed is a valid
    /// success) to the persistence worker and publishes `Done` immediately;
    /// a failure is recorded on the tracker and publishes `Error`.
    fn trigger<Make, Fut>(&self, ty: RequestType, fetch: Make)
    where
        Make: Fn(Arc<F>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<PageBatch<T>, FetchError>> + Send + 'static,
    {
        self.publish(LoaderState::Loading);

        let source = Arc::clone(&self.source);
        let persist = self.persist.clone();
        let loader = self.loader.clone();
        self.tracker.run_if_not_running(ty, move |handle| {
            let page = fetch(Arc::clone(&source));
            let persist = persist.clone();
            let loader = loader.clone();
            tokio::spawn(async move {
                match page.await {
                    Ok(batch) => {
                        tracing::debug!(request_type = %ty, count = batch.len(), "page fetched");
                        persist.enqueue(batch.into_items(), handle);
                        loader.send_replace(LoaderState::Done);
                    },
                    Err(cause) => {
                        tracing::error!(request_type = %ty, error = %cause, "failed to load page");
                        handle.record_failure(cause);
                        loader.send_replace(LoaderState::Error);
                    },
                }
            });
        });
    }

    /// Report a missing-cursor precondition violation for `ty`.
    ///
    /// The source is not invoked and the tracker is not engaged: a retry of
    /// a cursor-less boundary item could never succeed, so no retry state
    /// is created for it.
    fn fail_precondition(&self, ty: RequestType) {
        let cause = FetchError::MissingCursor;
        tracing::error!(
            request_type = %ty,
            error = %cause,
            "boundary item has no cursor, fetch not attempted"
        );
        metrics::counter!("feedpager.request.precondition_violation", "request_type" => ty.to_string())
            .increment(1);
        self.publish(LoaderState::Error);
    }

    fn publish(&self, state: LoaderState) {
        self.loader.send_replace(state);
    }
}

impl<T, F> Clone for BoundaryFetchCoordinator<T, F>
where
    T: PageItem,
    F: PageSource<Item = T>,
{
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            tracker: self.tracker.clone(),
            persist: self.persist.clone(),
            loader: self.loader.clone(),
        }
    }
}
