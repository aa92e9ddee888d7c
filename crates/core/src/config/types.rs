//! Configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::pool::PoolConfig;
use crate::service::ConversionSettings;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Conversion service endpoint.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Worker pool tuning.
    #[serde(default)]
    pub pool: PoolConfig,

    /// Result delivery.
    #[serde(default)]
    pub download: DownloadConfig,

    /// Default conversion settings, reconciled against the capability
    /// set at startup.
    #[serde(default)]
    pub defaults: DefaultSettings,
}

/// Conversion service endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the conversion service; `/api/convert` is appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_timeout() -> u64 {
    60
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Bulk download configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Directory converted files are written to.
    #[serde(default = "default_download_dir")]
    pub dir: PathBuf,

    /// Delay between successive deliveries in milliseconds.
    #[serde(default = "default_pace")]
    pub pace_ms: u64,
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("converted")
}

fn default_pace() -> u64 {
    150
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            dir: default_download_dir(),
            pace_ms: default_pace(),
        }
    }
}

/// Default output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultSettings {
    /// Preferred output format.
    #[serde(default = "default_format")]
    pub format: String,

    /// Quality, 0-100.
    #[serde(default = "default_quality")]
    pub quality: u8,

    /// Target width; 0 means unconstrained.
    #[serde(default)]
    pub width: u32,

    /// Target height; 0 means unconstrained.
    #[serde(default)]
    pub height: u32,
}

fn default_format() -> String {
    "webp".to_string()
}

fn default_quality() -> u8 {
    80
}

impl Default for DefaultSettings {
    fn default() -> Self {
        Self {
            format: default_format(),
            quality: default_quality(),
            width: 0,
            height: 0,
        }
    }
}

impl DefaultSettings {
    /// Materialize as runtime conversion settings.
    pub fn to_settings(&self) -> ConversionSettings {
        ConversionSettings::new(self.format.clone())
            .with_quality(self.quality)
            .with_dimensions(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.base_url, "http://127.0.0.1:3000");
        assert_eq!(config.service.timeout_secs, 60);
        assert_eq!(config.pool.concurrency, 4);
        assert_eq!(config.download.pace_ms, 150);
        assert_eq!(config.defaults.format, "webp");
        assert_eq!(config.defaults.quality, 80);
    }

    #[test]
    fn test_defaults_to_settings_drops_zero_dimensions() {
        let defaults = DefaultSettings {
            width: 1920,
            height: 0,
            ..Default::default()
        };
        let settings = defaults.to_settings();
        assert_eq!(settings.width, Some(1920));
        assert_eq!(settings.height, None);
    }
}
