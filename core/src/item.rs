//! Paginated items, cursors, and page batches.
//!
//! The coordinator never caches items: a fetched batch is held only long
//! enough to hand it to the storage collaborator. What the coordinator does
//! need from an item is its ordering key, the [`Cursor`], which is how the
//! page after (or before) that item is requested.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for [`Cursor`] parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid cursor: {0}")]
pub struct ParseCursorError(String);

/// Opaque ordering key derived from an item.
///
/// A cursor identifies a position in the remote feed and is used to request
/// the page after (or before) that position. The orchestrator never
/// interprets its contents.
///
/// # Validation
///
/// - `FromStr::from_str()`: validates input (rejects empty strings)
/// - `From::from()` and `new()`: no validation (for application-controlled
///   data such as keys read back from the local store)
///
/// # Examples
///
/// ```
/// use feedpager_core::item::Cursor;
///
/// let cursor = Cursor::new("t3_9gf4dx");
/// assert_eq!(cursor.as_str(), "t3_9gf4dx");
///
/// let parsed: Cursor = "t3_9gf4dx".parse().unwrap();
/// assert_eq!(parsed, cursor);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor(String);

impl Cursor {
    /// Create a new `Cursor` from a string.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the cursor as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert the `Cursor` into its inner `String`.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Cursor {
    type Err = ParseCursorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseCursorError("cursor cannot be empty".to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl From<String> for Cursor {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Cursor {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A paginated domain unit: an ordered, post-like record.
///
/// The orchestrator is agnostic to the item's shape; it only ever asks for
/// the item's cursor when a boundary event fires at that item.
pub trait PageItem: Clone + Send + Sync + 'static {
    /// The ordering key used to request the page adjacent to this item.
    ///
    /// Returns `None` when the item carries no extractable key (a malformed
    /// upstream record). Paging from such an item is a precondition
    /// violation: the coordinator fails fast instead of issuing a fetch.
    fn cursor(&self) -> Option<Cursor>;
}

/// An ordered batch of items returned by one remote fetch.
///
/// A batch may be empty — that is a valid success meaning the end of the
/// feed was reached, never an error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBatch<T> {
    items: Vec<T>,
}

impl<T> PageBatch<T> {
    /// Create a batch from fetched items.
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    /// Create an empty batch (end of feed, or an absent response body).
    #[must_use]
    pub const fn empty() -> Self {
        Self { items: Vec::new() }
    }

    /// Number of items in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the batch carries no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consume the batch, yielding its items in feed order.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T> Default for PageBatch<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> From<Vec<T>> for PageBatch<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T> IntoIterator for PageBatch<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
