//! Property test for the request tracker's status machine.
//!
//! Runs random operation sequences against a 3-slot model and checks that
//! the tracker's observable statuses always agree with it, and that at most
//! one completion handle is live per request type.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use feedpager_core::{FetchError, RequestStatus, RequestType};
use feedpager_runtime::{RequestHandle, RequestTracker};
use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
enum Op {
    /// Boundary signal for one request type.
    Run(usize),
    /// The in-flight fetch (if any) for one type completes successfully.
    CompleteOk(usize),
    /// The in-flight fetch (if any) for one type fails.
    CompleteErr(usize),
    /// External retry trigger.
    RetryAll,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..RequestType::COUNT).prop_map(Op::Run),
        (0..RequestType::COUNT).prop_map(Op::CompleteOk),
        (0..RequestType::COUNT).prop_map(Op::CompleteErr),
        Just(Op::RetryAll),
    ]
}

/// Pending completion handles, keyed by slot index. Exactly one handle is
/// live per type while that type's slot is `Running`.
#[derive(Clone, Default)]
struct PendingHandles(Arc<Mutex<HashMap<usize, Vec<RequestHandle>>>>);

impl PendingHandles {
    fn capture_into(&self, index: usize) -> impl Fn(RequestHandle) + Send + Sync + use<> {
        let inner = Arc::clone(&self.0);
        move |handle| inner.lock().unwrap().entry(index).or_default().push(handle)
    }

    fn take(&self, index: usize) -> Option<RequestHandle> {
        self.0.lock().unwrap().entry(index).or_default().pop()
    }

    fn live_count(&self, index: usize) -> usize {
        self.0
            .lock()
            .unwrap()
            .get(&index)
            .map_or(0, std::vec::Vec::len)
    }
}

fn check_ops(ops: &[Op]) {
    let tracker = RequestTracker::new();
    let pending = PendingHandles::default();
    let mut model = [RequestStatus::Idle; RequestType::COUNT];

    for op in ops {
        match *op {
            Op::Run(i) => {
                let launched =
                    tracker.run_if_not_running(RequestType::ALL[i], pending.capture_into(i));
                assert_eq!(launched, model[i] != RequestStatus::Running);
                if launched {
                    model[i] = RequestStatus::Running;
                }
            },
            Op::CompleteOk(i) => {
                if let Some(handle) = pending.take(i) {
                    handle.record_success();
                    model[i] = RequestStatus::Idle;
                }
            },
            Op::CompleteErr(i) => {
                if let Some(handle) = pending.take(i) {
                    handle.record_failure(FetchError::transport("injected"));
                    model[i] = RequestStatus::Failed;
                }
            },
            Op::RetryAll => {
                let failed = model
                    .iter()
                    .filter(|status| **status == RequestStatus::Failed)
                    .count();
                assert_eq!(tracker.retry_all_failed(), failed);
                for status in &mut model {
                    if *status == RequestStatus::Failed {
                        *status = RequestStatus::Running;
                    }
                }
            },
        }

        for (i, ty) in RequestType::ALL.iter().enumerate() {
            assert_eq!(tracker.status_of(*ty), model[i]);
            let expected_live = usize::from(model[i] == RequestStatus::Running);
            assert_eq!(pending.live_count(i), expected_live);
        }
    }
}

proptest! {
    #[test]
    fn tracker_statuses_agree_with_the_model(
        ops in prop::collection::vec(op_strategy(), 0..48)
    ) {
        check_ops(&ops);
    }
}
