//! Loading phase broadcast to observers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse phase describing the coordinator's current activity.
///
/// Published through a single-slot, last-write-wins channel: observers see
/// the most recent known phase, not a per-request event stream. A `Loading`
/// publish and a near-simultaneous publish from another request type's
/// completion carry no ordering guarantee between them.
///
/// Not persisted anywhere; purely a momentary status signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoaderState {
    /// A fetch has been triggered and has not completed yet.
    Loading,
    /// The most recent fetch completed successfully (its persistence may
    /// still be in flight — completion is optimistic).
    Done,
    /// The most recent fetch failed; a retry may be triggered externally.
    Error,
}

impl fmt::Display for LoaderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "loading"),
            Self::Done => write!(f, "done"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;

    #[test]
    fn display_is_lowercase() {
        assert_eq!(LoaderState::Loading.to_string(), "loading");
        assert_eq!(LoaderState::Done.to_string(), "done");
        assert_eq!(LoaderState::Error.to_string(), "error");
    }

    #[test]
    fn serializes_as_enum_tag() {
        let json = serde_json::to_string(&LoaderState::Error).unwrap();
        assert_eq!(json, "\"Error\"");
    }
}
