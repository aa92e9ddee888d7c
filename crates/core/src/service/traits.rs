//! Trait definition for the conversion service client.

use async_trait::async_trait;

use crate::item::SourceImage;

use super::error::ConvertError;
use super::types::{ConversionSettings, ConvertedImage};

/// A client for the remote conversion service.
///
/// The worker pool is generic over this trait so tests can drive it with
/// a scripted mock instead of a live endpoint.
#[async_trait]
pub trait ConvertService: Send + Sync {
    /// Fetch the set of output formats the service currently supports.
    async fn supported_formats(&self) -> Result<Vec<String>, ConvertError>;

    /// Convert one image with the given settings.
    async fn convert(
        &self,
        source: &SourceImage,
        settings: &ConversionSettings,
    ) -> Result<ConvertedImage, ConvertError>;
}
