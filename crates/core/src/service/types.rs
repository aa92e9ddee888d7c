//! Conversion settings and exchange payloads.

use serde::{Deserialize, Serialize};

use super::error::ConvertError;

/// Process-wide output settings, applied to every queued item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionSettings {
    /// Target format identifier; must be in the loaded capability set.
    pub format: String,
    /// Quality, 0-100.
    #[serde(default = "default_quality")]
    pub quality: u8,
    /// Target width; `None` means unconstrained.
    #[serde(default)]
    pub width: Option<u32>,
    /// Target height; `None` means unconstrained.
    #[serde(default)]
    pub height: Option<u32>,
}

fn default_quality() -> u8 {
    80
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            format: "webp".to_string(),
            quality: default_quality(),
            width: None,
            height: None,
        }
    }
}

impl ConversionSettings {
    /// Create settings for the given format with defaults elsewhere.
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            ..Default::default()
        }
    }

    /// Set the quality.
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Set target dimensions; zero means unconstrained.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = (width > 0).then_some(width);
        self.height = (height > 0).then_some(height);
        self
    }

    /// Reject settings that cannot form a valid exchange.
    pub fn validate(&self) -> Result<(), ConvertError> {
        if self.format.is_empty() {
            return Err(ConvertError::InvalidSettings(
                "no output format selected".to_string(),
            ));
        }
        if self.quality > 100 {
            return Err(ConvertError::InvalidSettings(format!(
                "quality must be 0-100, got {}",
                self.quality
            )));
        }
        Ok(())
    }
}

/// A converted payload as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedImage {
    /// Suggested output filename.
    pub name: String,
    /// Converted content.
    pub bytes: Vec<u8>,
}

/// File extension for the given output format.
///
/// `jpeg` maps to `jpg`; every other format uses its own name.
pub fn extension_for(format: &str) -> &str {
    if format == "jpeg" {
        "jpg"
    } else {
        format
    }
}

/// Derive the output filename from a source name and target format.
///
/// Strips the last extension (if any) and appends the format's extension:
/// `photo.PNG` + `jpeg` -> `photo.jpg`.
pub fn output_name(source_name: &str, format: &str) -> String {
    let base = match source_name.rfind('.') {
        // A leading dot is a hidden-file name, not an extension.
        Some(idx) if idx > 0 => &source_name[..idx],
        _ => source_name,
    };
    format!("{}.{}", base, extension_for(format))
}
