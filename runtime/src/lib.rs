//! # Feedpager Runtime
//!
//! The pagination-driving fetch orchestrator: boundary events in, gated
//! remote fetches out.
//!
//! ## Core Components
//!
//! - **[`RequestTracker`]**: per request-type status registry preventing
//!   concurrent duplicate in-flight fetches, with retry bookkeeping
//! - **[`BoundaryFetchCoordinator`]**: reacts to "list exhausted at
//!   start/end" signals, consults the tracker, issues the appropriate
//!   fetch, persists results, and publishes a loading-phase signal
//! - **[`PersistQueue`]**: single background worker serializing inserts
//!   into the local store
//!
//! ## Example
//!
//! ```ignore
//! use feedpager_runtime::BoundaryFetchCoordinator;
//!
//! let coordinator = BoundaryFetchCoordinator::new(api, db);
//! let mut loader = coordinator.subscribe();
//!
//! // From the consuming list's boundary callbacks:
//! coordinator.on_list_empty();
//! coordinator.on_end_reached(&last_visible_item);
//!
//! // From a user-facing retry affordance after an error:
//! coordinator.retry_all_failed();
//! ```

/// Per request-type status registry and retry bookkeeping.
pub mod tracker;

/// Serialized persistence of fetched batches.
pub mod persist;

/// Boundary-event driven fetch coordination.
pub mod coordinator;

pub use coordinator::BoundaryFetchCoordinator;
pub use persist::PersistQueue;
pub use tracker::{FetchAction, RequestHandle, RequestTracker};
