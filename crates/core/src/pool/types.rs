//! Types for the conversion worker pool.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when starting pool work.
#[derive(Debug, Error)]
pub enum PoolError {
    /// A bulk run is already in progress.
    #[error("a bulk conversion is already running")]
    Busy,
}

/// Outcome of a bulk conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOutcome {
    /// Items that finished with a result.
    pub converted: usize,
    /// Items that finished with an error.
    pub failed: usize,
    /// Items skipped because they were removed mid-run.
    pub skipped: usize,
}

impl BulkOutcome {
    /// Total items the run settled one way or another.
    pub fn total(&self) -> usize {
        self.converted + self.failed + self.skipped
    }
}
