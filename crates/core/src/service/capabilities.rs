//! Server-side format capability set and selection fallback.

use tracing::{info, warn};

use crate::metrics;

use super::error::ConvertError;
use super::traits::ConvertService;

/// Format preferred when the current selection is unsupported.
pub const PREFERRED_FORMAT: &str = "webp";

/// The set of output formats the service currently supports.
///
/// Loaded once at startup; a load failure leaves conversion disabled and
/// is not retried automatically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatCapabilities {
    formats: Vec<String>,
}

impl FormatCapabilities {
    /// Build from an already-known format list (tests, cached sets).
    pub fn from_formats(formats: Vec<String>) -> Self {
        Self { formats }
    }

    /// Fetch the capability set from the service.
    pub async fn load<S: ConvertService + ?Sized>(service: &S) -> Result<Self, ConvertError> {
        let formats = match service.supported_formats().await {
            Ok(formats) => {
                metrics::CAPABILITY_LOADS.with_label_values(&["ok"]).inc();
                formats
            }
            Err(e) => {
                metrics::CAPABILITY_LOADS
                    .with_label_values(&["failed"])
                    .inc();
                return Err(e);
            }
        };
        if formats.is_empty() {
            warn!("service reports no supported output formats");
        } else {
            info!(count = formats.len(), "format capabilities loaded");
        }
        Ok(Self { formats })
    }

    /// Supported format identifiers, in service order.
    pub fn formats(&self) -> &[String] {
        &self.formats
    }

    /// Whether the service supports any format at all.
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// Whether a specific format is supported.
    pub fn contains(&self, format: &str) -> bool {
        self.formats.iter().any(|f| f == format)
    }

    /// Reconcile a selection against the capability set.
    ///
    /// Keeps `current` when supported; otherwise falls back to
    /// [`PREFERRED_FORMAT`], then to the first available format. Returns
    /// `None` when the set is empty, which must disable conversion.
    pub fn resolve_selection(&self, current: &str) -> Option<String> {
        if !current.is_empty() && self.contains(current) {
            return Some(current.to_string());
        }
        if self.contains(PREFERRED_FORMAT) {
            return Some(PREFERRED_FORMAT.to_string());
        }
        self.formats.first().cloned()
    }
}
