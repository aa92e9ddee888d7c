//! Bulk delivery of converted results.
//!
//! Delivery targets are abstracted behind [`DownloadSink`]; the default
//! [`FsSink`] writes files to a directory. [`BulkDownloader`] walks every
//! ready result in display order with a fixed pause between deliveries.

mod bulk;
mod sink;

pub use bulk::BulkDownloader;
pub use sink::{DownloadSink, FsSink, SinkError};
