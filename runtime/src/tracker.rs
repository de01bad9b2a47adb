//! Per-type request status registry and retry bookkeeping.
//!
//! The [`RequestTracker`] is the mutual-exclusion gate of the whole
//! orchestrator: for each [`RequestType`] it keeps exactly one slot, and a
//! fetch may only start when that slot is not already `Running`. The slot
//! table is the single piece of shared mutable state crossing threads of
//! control, guarded by one `std::sync::Mutex` — the lock is never held
//! across an `.await`, and user-supplied actions are always invoked after
//! it is released.

use feedpager_core::{FetchError, RequestStatus, RequestType};
use std::sync::{Arc, Mutex, MutexGuard};

/// A stored fetch attempt, re-invokable on retry.
///
/// The action receives the completion handle bound to the slot's current
/// attempt and must arrange for exactly one terminal call on it. Actions
/// must not block the caller: launch the actual work on the async runtime.
pub type FetchAction = Arc<dyn Fn(RequestHandle) + Send + Sync>;

/// One request type's slot: status, current attempt, retry state.
#[derive(Default)]
struct RequestSlot {
    status: RequestStatus,
    /// Bumped on every launch; completion handles carry the generation they
    /// were issued under, which is how stale completions are detected.
    generation: u64,
    /// The current attempt's action, retained while `Running` or `Failed`
    /// so an external retry trigger can re-invoke it.
    action: Option<FetchAction>,
    /// Cause of the last failure, retained while `Failed`.
    failure: Option<FetchError>,
}

/// Per request-type status registry preventing concurrent duplicate
/// in-flight requests, with retry bookkeeping.
///
/// Cheap to clone; clones share the same slot table.
///
/// # Example
///
/// ```
/// use feedpager_core::{RequestStatus, RequestType};
/// use feedpager_runtime::RequestTracker;
///
/// let tracker = RequestTracker::new();
/// let launched = tracker.run_if_not_running(RequestType::Initial, |handle| {
///     // kick off the fetch, then eventually:
///     handle.record_success();
/// });
/// assert!(launched);
/// assert_eq!(tracker.status_of(RequestType::Initial), RequestStatus::Idle);
/// ```
#[derive(Clone, Default)]
pub struct RequestTracker {
    slots: Arc<Mutex<[RequestSlot; RequestType::COUNT]>>,
}

impl RequestTracker {
    /// Create a tracker with all slots `Idle`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
    fn lock(&self) -> MutexGuard<'_, [RequestSlot; RequestType::COUNT]> {
        self.slots.lock().unwrap()
    }

    /// Launch `action` for `ty` unless a request of that type is already
    /// in flight.
    ///
    /// The running check and the transition to `Running` happen in one
    /// critical section, so two near-simultaneous boundary signals cannot
    /// both observe an idle slot. When the slot is `Running` the signal is
    /// dropped and `false` is returned; otherwise the slot transitions to
    /// `Running`, the action is stored for later retry, and it is invoked
    /// exactly once — after the lock is released — with a [`RequestHandle`]
    /// bound to this attempt.
    ///
    /// Returns whether the action was launched.
    pub fn run_if_not_running<A>(&self, ty: RequestType, action: A) -> bool
    where
        A: Fn(RequestHandle) + Send + Sync + 'static,
    {
        let action: FetchAction = Arc::new(action);
        let generation = {
            let mut slots = self.lock();
            let slot = &mut slots[ty.index()];
            if slot.status == RequestStatus::Running {
                tracing::debug!(request_type = %ty, "duplicate boundary signal dropped");
                metrics::counter!("feedpager.request.deduplicated", "request_type" => ty.to_string())
                    .increment(1);
                return false;
            }
            slot.status = RequestStatus::Running;
            slot.generation += 1;
            slot.failure = None;
            slot.action = Some(Arc::clone(&action));
            slot.generation
        };

        tracing::debug!(request_type = %ty, generation, "request launched");
        metrics::counter!("feedpager.request.launched", "request_type" => ty.to_string())
            .increment(1);
        action(RequestHandle {
            tracker: self.clone(),
            ty,
            generation,
        });
        true
    }

    /// Re-launch every request currently `Failed`.
    ///
    /// Each failed slot transitions back to `Running` and its stored action
    /// is re-invoked exactly once with a fresh completion handle, outside
    /// the lock. Returns how many requests were retried.
    ///
    /// Typically driven by an external user-initiated retry trigger.
    pub fn retry_all_failed(&self) -> usize {
        let retries: Vec<(RequestType, u64, FetchAction)> = {
            let mut slots = self.lock();
            RequestType::ALL
                .iter()
                .filter_map(|&ty| {
                    let slot = &mut slots[ty.index()];
                    if slot.status != RequestStatus::Failed {
                        return None;
                    }
                    let action = slot.action.clone()?;
                    slot.status = RequestStatus::Running;
                    slot.generation += 1;
                    slot.failure = None;
                    Some((ty, slot.generation, action))
                })
                .collect()
        };

        for (ty, generation, action) in &retries {
            tracing::debug!(request_type = %ty, generation, "failed request retried");
            metrics::counter!("feedpager.request.retried", "request_type" => ty.to_string())
                .increment(1);
            action(RequestHandle {
                tracker: self.clone(),
                ty: *ty,
                generation: *generation,
            });
        }
        retries.len()
    }

    /// Current status of the slot for `ty`.
    #[must_use]
    pub fn status_of(&self, ty: RequestType) -> RequestStatus {
        self.lock()[ty.index()].status
    }

    /// Cause of the last failure for `ty`, while the slot is `Failed`.
    #[must_use]
    pub fn failure_of(&self, ty: RequestType) -> Option<FetchError> {
        self.lock()[ty.index()].failure.clone()
    }

    /// Whether any slot is currently `Failed`.
    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.lock()
            .iter()
            .any(|slot| slot.status == RequestStatus::Failed)
    }
}

impl std::fmt::Debug for RequestTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        let slots = self.lock();
        for ty in RequestType::ALL {
            map.entry(&ty.to_string(), &slots[ty.index()].status.to_string());
        }
        map.finish()
    }
}

/// Completion handle bound to one attempt of one request type.
///
/// Exactly one of [`record_success`](Self::record_success) or
/// [`record_failure`](Self::record_failure) must be called per attempt;
/// both consume the handle. A completion that reaches a slot which is no
/// longer `Running` under this handle's generation is a protocol violation
/// (double completion, or completion after the slot was superseded by a
/// fresh attempt) and panics rather than corrupting the mutual-exclusion
/// gate.
#[derive(Debug)]
pub struct RequestHandle {
    tracker: RequestTracker,
    ty: RequestType,
    generation: u64,
}

impl RequestHandle {
    /// The request type this handle completes.
    #[must_use]
    pub const fn request_type(&self) -> RequestType {
        self.ty
    }

    /// Record that this attempt succeeded: `Running → Idle`, stored retry
    /// action and failure cause cleared.
    ///
    /// # Panics
    ///
    /// Panics when the slot is not `Running` under this handle's
    /// generation — a double completion or a completion after supersession.
    pub fn record_success(self) {
        {
            let mut slots = self.tracker.lock();
            let slot = &mut slots[self.ty.index()];
            self.check_live(slot);
            slot.status = RequestStatus::Idle;
            slot.action = None;
            slot.failure = None;
        }
        tracing::debug!(request_type = %self.ty, "request succeeded");
        metrics::counter!("feedpager.request.succeeded", "request_type" => self.ty.to_string())
            .increment(1);
    }

    /// Record that this attempt failed: `Running → Failed`, with `cause`
    /// and the attempt's action retained for [`RequestTracker::retry_all_failed`].
    ///
    /// # Panics
    ///
    /// Panics when the slot is not `Running` under this handle's
    /// generation — a double completion or a completion after supersession.
    pub fn record_failure(self, cause: FetchError) {
        {
            let mut slots = self.tracker.lock();
            let slot = &mut slots[self.ty.index()];
            self.check_live(slot);
            slot.status = RequestStatus::Failed;
            slot.failure = Some(cause.clone());
        }
        tracing::warn!(request_type = %self.ty, error = %cause, "request failed");
        metrics::counter!("feedpager.request.failed", "request_type" => self.ty.to_string())
            .increment(1);
    }

    // A completion on a non-running slot means the completion protocol was
    // broken; masking it would silently corrupt the mutual-exclusion gate,
    // so it must surface as a panic.
    #[allow(clippy::panic)]
    fn check_live(&self, slot: &RequestSlot) {
        if slot.status != RequestStatus::Running || slot.generation != self.generation {
            panic!(
                "request completion recorded twice or after supersession \
                 (type {}, handle generation {}, slot generation {}, slot status {})",
                self.ty, self.generation, slot.generation, slot.status
            );
        }
    }
}
