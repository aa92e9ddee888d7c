//! Error types for the conversion exchange.

use thiserror::Error;

/// Errors that can occur talking to the conversion service.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The request timed out.
    #[error("conversion request timed out")]
    Timeout,

    /// Could not reach the service.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The service answered with a non-success status.
    #[error("conversion rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// The response body could not be read or decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Settings were rejected before any request was made.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

impl ConvertError {
    /// Message recorded on the failed item.
    ///
    /// For a rejection this is the service's own error body, per the wire
    /// contract; transport failures fall back to the display form.
    pub fn item_message(&self) -> String {
        match self {
            ConvertError::Rejected { message, .. } if !message.is_empty() => message.clone(),
            other => other.to_string(),
        }
    }

    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ConvertError::Timeout
        } else if err.is_connect() {
            ConvertError::ConnectionFailed(err.to_string())
        } else {
            ConvertError::InvalidResponse(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_item_message_uses_body() {
        let err = ConvertError::Rejected {
            status: 422,
            message: "unsupported format: bmp".to_string(),
        };
        assert_eq!(err.item_message(), "unsupported format: bmp");
    }

    #[test]
    fn test_rejected_empty_body_falls_back_to_display() {
        let err = ConvertError::Rejected {
            status: 500,
            message: String::new(),
        };
        assert!(err.item_message().contains("HTTP 500"));
    }

    #[test]
    fn test_timeout_item_message() {
        assert_eq!(
            ConvertError::Timeout.item_message(),
            "conversion request timed out"
        );
    }
}
