//! Serialized persistence of fetched batches.
//!
//! All inserts go through one dedicated background worker: a fetch's
//! persistence may overlap the next fetch's network I/O, but inserts among
//! themselves are serialized so batches land in the local store in the
//! order their fetches completed.

use crate::tracker::RequestHandle;
use feedpager_core::{FetchError, ItemStore};
use tokio::sync::mpsc;

/// A fetched batch awaiting insertion, with the completion handle of the
/// fetch that produced it.
struct PersistJob<T> {
    items: Vec<T>,
    handle: RequestHandle,
}

/// Handle to the single persistence worker.
///
/// Created with the storage collaborator, which the worker task takes
/// ownership of. Cloning shares the same worker; the worker shuts down when
/// every handle is dropped.
pub struct PersistQueue<T> {
    jobs: mpsc::UnboundedSender<PersistJob<T>>,
}

impl<T> Clone for PersistQueue<T> {
    fn clone(&self) -> Self {
        Self {
            jobs: self.jobs.clone(),
        }
    }
}

impl<T: Send + 'static> PersistQueue<T> {
    /// Spawn the persistence worker around `store`.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime (the worker is a spawned
    /// task).
    #[must_use]
    pub fn new<S>(store: S) -> Self
    where
        S: ItemStore<Item = T> + 'static,
    {
        let (jobs, receiver) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(store, receiver));
        Self { jobs }
    }

    /// Queue a fetched batch for insertion.
    ///
    /// Returns immediately; the worker later calls the store's `insert`,
    /// then records success on `handle` — or failure with
    /// [`FetchError::Storage`] when the write is rejected, leaving the
    /// request retryable. An empty batch is queued like any other so its
    /// fetch still completes through the same path.
    pub fn enqueue(&self, items: Vec<T>, handle: RequestHandle) {
        if self.jobs.send(PersistJob { items, handle }).is_err() {
            // Unreachable while any queue handle is alive; the worker only
            // stops once all senders are gone.
            tracing::error!("persistence worker is gone, dropping fetched batch");
        }
    }
}

async fn run_worker<T, S>(store: S, mut jobs: mpsc::UnboundedReceiver<PersistJob<T>>)
where
    T: Send + 'static,
    S: ItemStore<Item = T>,
{
    while let Some(PersistJob { items, handle }) = jobs.recv().await {
        let request_type = handle.request_type();
        let count = items.len();
        match store.insert(items).await {
            Ok(()) => {
                tracing::debug!(request_type = %request_type, count, "batch persisted");
                handle.record_success();
            },
            Err(cause) => {
                tracing::error!(
                    request_type = %request_type,
                    count,
                    error = %cause,
                    "failed to persist fetched batch"
                );
                handle.record_failure(FetchError::Storage(cause.to_string()));
            },
        }
    }
    tracing::debug!("persistence worker stopped");
}
