//! Bounded-concurrency conversion worker pool.
//!
//! A bulk run snapshots the item set into a shared queue, then spawns a
//! fixed number of workers that pop ids until the queue drains. Only one
//! bulk run may be active at a time; single-item conversions go through
//! [`ConversionPool::convert_one`].

mod config;
mod runner;
mod types;

pub use config::PoolConfig;
pub use runner::ConversionPool;
pub use types::{BulkOutcome, PoolError};
