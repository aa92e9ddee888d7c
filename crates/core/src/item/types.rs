//! Core item data types.

use serde::{Deserialize, Serialize};

use super::handle::TransientHandle;

/// An image as submitted by the user: original filename plus raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// Original filename, used for display and output-name derivation.
    pub name: String,
    /// Raw file content.
    pub bytes: Vec<u8>,
}

impl SourceImage {
    /// Create a new source image.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Conversion state of a single queue item.
///
/// State machine:
/// ```text
/// Idle -> Converting -> Done
///              |
///              v
///            Error -> Converting (manual retry)
/// ```
///
/// `Converting` is exclusive: an item already converting is never picked
/// up a second time. `Done` items are not retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Queued, not yet attempted (or results cleared).
    Idle,
    /// A conversion exchange is in flight.
    Converting,
    /// Converted successfully; the result payload is attached.
    Done,
    /// The last attempt failed; retryable.
    Error,
}

impl ItemStatus {
    /// Returns true if a conversion attempt may start from this state.
    pub fn can_convert(&self) -> bool {
        matches!(self, ItemStatus::Idle | ItemStatus::Error)
    }

    /// Returns true if this is a settled outcome of a bulk run.
    pub fn is_settled(&self) -> bool {
        matches!(self, ItemStatus::Done | ItemStatus::Error)
    }

    /// Returns the status as a string (for logs and metrics labels).
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Idle => "idle",
            ItemStatus::Converting => "converting",
            ItemStatus::Done => "done",
            ItemStatus::Error => "error",
        }
    }
}

/// One queued file and its conversion state.
///
/// Owns its transient handles exclusively: dropping the item (removal,
/// clear-all, store teardown) releases them through the handle registry.
#[derive(Debug)]
pub struct ConversionItem {
    /// Process-local id, monotonically assigned, never reused.
    pub id: u64,
    /// The original file. Immutable after creation.
    pub source: SourceImage,
    /// Renderable copy of the source, created at add time.
    pub preview: TransientHandle,
    /// Current conversion state.
    pub status: ItemStatus,
    /// Converted payload; present iff `status == Done`.
    pub result: Option<TransientHandle>,
    /// Suggested output filename; empty unless `status == Done`.
    pub result_name: String,
    /// Failure message; present iff `status == Error`.
    pub error: Option<String>,
}

impl ConversionItem {
    /// Whether the item holds a downloadable result.
    pub fn is_ready(&self) -> bool {
        self.status == ItemStatus::Done && self.result.is_some()
    }
}
