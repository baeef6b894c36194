//! Translation errors

use resilience::{ProviderFailure, Retryable};
use thiserror::Error;

/// Errors that can occur during translation
#[derive(Debug, Error)]
pub enum TranslationError {
    /// Failed to connect to translation service
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to translation service failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Service answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Api {
        /// HTTP (or vendor-reported) status code
        status: u16,
        /// Error message reported by the service
        message: String,
    },

    /// Response parsing failed or carried no translation
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Request exceeded the client timeout
    #[error("Translation request timed out")]
    Timeout,

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Provider has no credentials
    #[error("Provider not available: {0}")]
    NotAvailable(String),
}

impl TranslationError {
    /// HTTP status associated with this error, if any
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::RateLimited => Some(429),
            _ => None,
        }
    }
}

impl Retryable for TranslationError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::ConnectionFailed(_) | Self::RateLimited => true,
            Self::Api { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for TranslationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}

impl From<TranslationError> for ProviderFailure {
    fn from(err: TranslationError) -> Self {
        Self {
            status: err.status_code(),
            message: err.to_string(),
        }
    }
}
