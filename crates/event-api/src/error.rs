//! Error types for the event API crate.

use newsletter_core::errors::{Error, SchedulingError};
use thiserror::Error;

/// Result type alias for event API operations.
pub type Result<T> = std::result::Result<T, EventApiError>;

/// Errors that can occur while talking to the event API.
#[derive(Debug, Error)]
pub enum EventApiError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success response from the event API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Client-side misconfiguration (missing key, bad header value, etc.)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl EventApiError {
    /// Create an API error from status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<EventApiError> for SchedulingError {
    fn from(err: EventApiError) -> Self {
        match err {
            EventApiError::Http(e) if e.is_decode() => {
                SchedulingError::InvalidResponse(e.to_string())
            }
            EventApiError::Http(e) => SchedulingError::Unreachable(e.to_string()),
            EventApiError::Json(e) => SchedulingError::InvalidResponse(e.to_string()),
            EventApiError::Api { status, message } => SchedulingError::Rejected { status, message },
            EventApiError::Config(message) => SchedulingError::Internal(message),
        }
    }
}

impl From<EventApiError> for Error {
    fn from(err: EventApiError) -> Self {
        Error::Scheduling(err.into())
    }
}
