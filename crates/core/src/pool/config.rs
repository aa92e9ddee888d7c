//! Worker pool configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the conversion worker pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Maximum number of conversion requests in flight at once.
    /// Workers share a single queue, so fewer than `concurrency` workers
    /// run when fewer items remain.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    4
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}
