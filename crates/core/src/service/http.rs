//! HTTP implementation of the conversion exchange.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::ServiceConfig;
use crate::item::SourceImage;

use super::error::ConvertError;
use super::traits::ConvertService;
use super::types::{output_name, ConversionSettings, ConvertedImage};

/// `filename="..."` inside a content-disposition header.
static FILENAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)filename="([^"]+)""#).expect("invalid filename regex"));

/// Capability response body: `{"supported": ["webp", "png", ...]}`.
#[derive(Debug, Deserialize)]
struct SupportedResponse {
    #[serde(default)]
    supported: Vec<String>,
}

/// Conversion client backed by a remote `/api/convert` endpoint.
pub struct HttpConvertService {
    client: Client,
    endpoint: String,
}

impl HttpConvertService {
    /// Create a new client from the service configuration.
    pub fn new(config: &ServiceConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            endpoint: format!("{}/api/convert", config.base_url.trim_end_matches('/')),
        }
    }

    fn build_query(settings: &ConversionSettings) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("format", settings.format.clone()),
            ("quality", settings.quality.to_string()),
        ];
        if let Some(w) = settings.width {
            query.push(("w", w.to_string()));
        }
        if let Some(h) = settings.height {
            query.push(("h", h.to_string()));
        }
        query
    }

    fn mime_for(name: &str) -> &'static str {
        let ext = name
            .rsplit('.')
            .next()
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "webp" => "image/webp",
            "gif" => "image/gif",
            "avif" => "image/avif",
            "bmp" => "image/bmp",
            "tif" | "tiff" => "image/tiff",
            _ => "application/octet-stream",
        }
    }

    fn parse_filename(header: &str) -> Option<String> {
        FILENAME_RE
            .captures(header)
            .map(|caps| caps[1].to_string())
    }
}

#[async_trait]
impl ConvertService for HttpConvertService {
    async fn supported_formats(&self) -> Result<Vec<String>, ConvertError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header("cache-control", "no-store")
            .send()
            .await
            .map_err(ConvertError::from_transport)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ConvertError::Rejected { status, message });
        }

        let body: SupportedResponse = response
            .json()
            .await
            .map_err(|e| ConvertError::InvalidResponse(e.to_string()))?;
        debug!(formats = ?body.supported, "loaded supported formats");
        Ok(body.supported)
    }

    async fn convert(
        &self,
        source: &SourceImage,
        settings: &ConversionSettings,
    ) -> Result<ConvertedImage, ConvertError> {
        settings.validate()?;

        let part = Part::bytes(source.bytes.clone())
            .file_name(source.name.clone())
            .mime_str(Self::mime_for(&source.name))
            .map_err(|e| ConvertError::InvalidSettings(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .query(&Self::build_query(settings))
            .multipart(form)
            .send()
            .await
            .map_err(ConvertError::from_transport)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ConvertError::Rejected { status, message });
        }

        let name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(Self::parse_filename)
            .unwrap_or_else(|| output_name(&source.name, &settings.format));

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ConvertError::InvalidResponse(e.to_string()))?;

        Ok(ConvertedImage {
            name,
            bytes: bytes.to_vec(),
        })
    }
}
