//! # Feedpager Core
//!
//! Core types and collaborator traits for the feedpager boundary-fetch
//! orchestrator.
//!
//! Feedpager watches the edges of a locally cached, ordered list of items
//! and triggers remote page fetches exactly when the cache runs out of data
//! at either edge, without ever launching two overlapping fetches for the
//! same edge. This crate holds the vocabulary that the runtime crate
//! orchestrates:
//!
//! - **[`request::RequestType`]**: which edge a fetch serves
//!   (`Initial`, `Before`, `After`)
//! - **[`request::RequestStatus`]**: per-type in-flight status
//!   (`Idle`, `Running`, `Failed`)
//! - **[`loader::LoaderState`]**: coarse phase broadcast to observers
//!   (`Loading`, `Done`, `Error`)
//! - **[`item::PageItem`] / [`item::Cursor`]**: the paginated domain unit
//!   and its opaque ordering key
//! - **[`source::PageSource`]**: the remote-fetch collaborator
//! - **[`store::ItemStore`]**: the local persistence collaborator
//!
//! No execution machinery lives here; the `feedpager-runtime` crate owns
//! the request tracker, the coordinator, and the persistence worker.

/// Request classification and per-type in-flight status.
pub mod request;

/// Loading phase broadcast to observers.
pub mod loader;

/// Paginated items, cursors, and page batches.
pub mod item;

/// Remote-fetch collaborator contract and fetch errors.
pub mod source;

/// Local persistence collaborator contract.
pub mod store;

pub use item::{Cursor, PageBatch, PageItem};
pub use loader::LoaderState;
pub use request::{RequestStatus, RequestType};
pub use source::{FetchError, PageSource};
pub use store::{InsertError, ItemStore};
