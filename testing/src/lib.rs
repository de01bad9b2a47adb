//! # Feedpager Testing
//!
//! Mock collaborators and test helpers for the feedpager orchestrator.
//!
//! This crate provides:
//! - Mock implementations of the core collaborator traits
//!   ([`MockPageSource`], [`MockItemStore`])
//! - A sample paginated item ([`TestPost`])
//! - Tracing setup for integration tests
//!
//! ## Example
//!
//! ```ignore
//! use feedpager_runtime::BoundaryFetchCoordinator;
//! use feedpager_testing::{MockItemStore, MockPageSource, TestPost};
//!
//! #[tokio::test]
//! async fn first_load_persists_the_first_page() {
//!     let source = MockPageSource::new();
//!     source.push_batch(vec![TestPost::new("a"), TestPost::new("b")]);
//!     let store = MockItemStore::new();
//!
//!     let coordinator = BoundaryFetchCoordinator::new(source, store.clone());
//!     coordinator.on_list_empty();
//!     // ... drive the runtime, then assert on store.inserted_batches()
//! }
//! ```

/// Mock collaborators for orchestrator tests.
pub mod mocks;

/// Test helpers and utilities.
pub mod helpers {
    use tracing_subscriber::EnvFilter;

    /// Initialize tracing for a test binary, honoring `RUST_LOG`.
    ///
    /// Idempotent: repeated calls (one per test) are no-ops after the
    /// first, so every test can call it unconditionally.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}

// Re-export commonly used items
pub use helpers::init_tracing;
pub use mocks::{FetchCall, MockItemStore, MockPageSource, TestPost, test_epoch};
