//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Invalid language code
    #[error("Invalid language code: {0}")]
    InvalidLanguageCode(String),

    /// Unknown TTS service type
    #[error("Unknown TTS service type: {0}")]
    UnknownTtsService(String),

    /// Invalid speech speed
    #[error("Invalid speed {0}: must be between 0.25 and 4.0")]
    InvalidSpeed(f32),

    /// Validation failed for a named field
    #[error("Validation failed for '{field}': {message}")]
    Validation { field: String, message: String },
}

impl DomainError {
    /// Create a validation error for a field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Name of the offending request field
    pub fn field(&self) -> &str {
        match self {
            Self::InvalidLanguageCode(_) => "language",
            Self::UnknownTtsService(_) => "tts_service_type",
            Self::InvalidSpeed(_) => "speed",
            Self::Validation { field, .. } => field,
        }
    }
}
