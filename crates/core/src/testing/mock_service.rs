//! Mock conversion service for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::item::SourceImage;
use crate::service::{output_name, ConversionSettings, ConvertError, ConvertService, ConvertedImage};

/// A recorded conversion request for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedConversion {
    /// Source file name that was submitted.
    pub source_name: String,
    /// Settings the request carried.
    pub settings: ConversionSettings,
    /// Whether the conversion succeeded.
    pub success: bool,
}

/// Mock implementation of the ConvertService trait.
///
/// Provides controllable behavior for testing:
/// - Track conversion requests for assertions
/// - Script per-file failures
/// - Simulate request latency
/// - Track peak in-flight requests to assert concurrency bounds
/// - Configure the advertised format list
pub struct MockConvertService {
    formats: Mutex<Vec<String>>,
    failures: Mutex<HashMap<String, String>>,
    fail_capabilities: Mutex<bool>,
    latency: Mutex<Duration>,
    recorded: Mutex<Vec<RecordedConversion>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Default for MockConvertService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConvertService {
    /// Create a mock that converts everything and advertises the usual
    /// web formats.
    pub fn new() -> Self {
        Self {
            formats: Mutex::new(vec![
                "webp".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "avif".to_string(),
            ]),
            failures: Mutex::new(HashMap::new()),
            fail_capabilities: Mutex::new(false),
            latency: Mutex::new(Duration::ZERO),
            recorded: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Script a failure for requests whose source has this name.
    pub fn fail_for(self, name: &str, message: &str) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(name.to_string(), message.to_string());
        self
    }

    /// Add simulated latency to every request.
    pub fn with_latency_ms(self, ms: u64) -> Self {
        *self.latency.lock().unwrap() = Duration::from_millis(ms);
        self
    }

    /// Replace the advertised format list.
    pub fn with_formats(self, formats: &[&str]) -> Self {
        *self.formats.lock().unwrap() = formats.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Make `supported_formats` fail with a connection error.
    pub fn with_capability_failure(self) -> Self {
        *self.fail_capabilities.lock().unwrap() = true;
        self
    }

    /// Get all recorded conversion requests.
    pub fn recorded_conversions(&self) -> Vec<RecordedConversion> {
        self.recorded.lock().unwrap().clone()
    }

    /// Get the number of conversion requests performed.
    pub fn conversion_count(&self) -> usize {
        self.recorded.lock().unwrap().len()
    }

    /// Peak number of requests that were in flight simultaneously.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConvertService for MockConvertService {
    async fn supported_formats(&self) -> Result<Vec<String>, ConvertError> {
        if *self.fail_capabilities.lock().unwrap() {
            return Err(ConvertError::ConnectionFailed(
                "mock capability failure".to_string(),
            ));
        }
        Ok(self.formats.lock().unwrap().clone())
    }

    async fn convert(
        &self,
        source: &SourceImage,
        settings: &ConversionSettings,
    ) -> Result<ConvertedImage, ConvertError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let latency = *self.latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let failure = self.failures.lock().unwrap().get(&source.name).cloned();
        let success = failure.is_none();
        self.recorded.lock().unwrap().push(RecordedConversion {
            source_name: source.name.clone(),
            settings: settings.clone(),
            success,
        });

        match failure {
            Some(message) => Err(ConvertError::Rejected {
                status: 500,
                message,
            }),
            None => Ok(ConvertedImage {
                name: output_name(&source.name, &settings.format),
                bytes: source.bytes.iter().rev().copied().collect(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_mock_converts_by_default() {
        let service = MockConvertService::new();
        let source = fixtures::source_image("photo.png");
        let settings = ConversionSettings::new("webp");

        let image = service.convert(&source, &settings).await.unwrap();

        assert_eq!(image.name, "photo.webp");
        assert_eq!(service.conversion_count(), 1);
        assert!(service.recorded_conversions()[0].success);
    }

    #[tokio::test]
    async fn test_mock_scripted_failure() {
        let service = MockConvertService::new().fail_for("bad.png", "decode error");
        let source = fixtures::source_image("bad.png");
        let settings = ConversionSettings::new("webp");

        let err = service.convert(&source, &settings).await.unwrap_err();

        assert_eq!(err.item_message(), "decode error");
        assert!(!service.recorded_conversions()[0].success);
    }

    #[tokio::test]
    async fn test_mock_capability_failure() {
        let service = MockConvertService::new().with_capability_failure();
        assert!(service.supported_formats().await.is_err());
    }

    #[tokio::test]
    async fn test_mock_formats_override() {
        let service = MockConvertService::new().with_formats(&["png"]);
        assert_eq!(service.supported_formats().await.unwrap(), vec!["png"]);
    }
}
