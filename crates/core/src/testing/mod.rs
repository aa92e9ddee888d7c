//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the conversion service
//! and download sink traits, allowing full lifecycle tests without a
//! running conversion server.
//!
//! # Example
//!
//! ```rust,ignore
//! use pixferry_core::testing::{MockConvertService, MockSink};
//!
//! let service = MockConvertService::new()
//!     .fail_for("broken.png", "decode error")
//!     .with_latency_ms(20);
//! let sink = MockSink::new();
//!
//! // Use with ConversionPool / BulkDownloader...
//! ```

mod mock_service;
mod mock_sink;

pub use mock_service::{MockConvertService, RecordedConversion};
pub use mock_sink::{Delivery, MockSink};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::item::SourceImage;

    /// Create a test source image with a small payload.
    pub fn source_image(name: &str) -> SourceImage {
        SourceImage {
            name: name.to_string(),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        }
    }

    /// Create a batch of test source images named `img_0.png` onward.
    pub fn source_batch(count: usize) -> Vec<SourceImage> {
        (0..count)
            .map(|i| source_image(&format!("img_{i}.png")))
            .collect()
    }
}
