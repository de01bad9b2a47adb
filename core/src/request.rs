//! Request classification and per-type in-flight status.
//!
//! Every remote fetch is classified by which edge of the cached list it
//! serves. The runtime's `RequestTracker` keeps exactly one in-flight slot
//! per [`RequestType`], which is what makes duplicate boundary signals
//! cheap to drop.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which edge/kind of fetch a request serves.
///
/// There is exactly one in-flight slot per variant at any time: a second
/// boundary signal for an edge whose fetch is still running is dropped by
/// the tracker rather than queued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestType {
    /// First load: the cached list has zero items.
    Initial,
    /// Prepend: the cached list's head is visible and exhausted.
    Before,
    /// Append: the cached list's tail is visible and exhausted.
    After,
}

impl RequestType {
    /// Number of request types (the tracker's slot table size).
    pub const COUNT: usize = 3;

    /// All request types, in slot order.
    pub const ALL: [Self; Self::COUNT] = [Self::Initial, Self::Before, Self::After];

    /// Stable slot index for this request type.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Initial => 0,
            Self::Before => 1,
            Self::After => 2,
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initial => write!(f, "initial"),
            Self::Before => write!(f, "before"),
            Self::After => write!(f, "after"),
        }
    }
}

/// In-flight status of one request type's slot.
///
/// Owned exclusively by the runtime's `RequestTracker`; it is mutated only
/// through the tracker's API and read-only to everyone else.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    /// No fetch in flight and no recorded failure.
    #[default]
    Idle,
    /// A fetch is in flight; further signals for this type are dropped.
    Running,
    /// The last fetch failed; a retry action and cause are retained.
    Failed,
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Failed => write!(f, "failed"),
        }
    }
}
