//! Pipeline errors

use domain::{PipelineState, Stage};
use resilience::{ChainError, ClassifiedError, ProviderAttempt};
use thiserror::Error;

/// Errors that end a pipeline run
///
/// Every variant carries the stage it happened in; the orchestrator uses it
/// to report `PipelineState::Failed(stage)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Input rejected before any provider was called
    #[error("invalid {field} for {stage}: {message}")]
    Validation {
        /// Stage that rejected the input
        stage: Stage,
        /// Offending input field
        field: String,
        /// Human-readable reason
        message: String,
    },

    /// A single provider failed and there was nothing to fall back to
    #[error("{error}")]
    Provider {
        /// Stage of the failing provider
        stage: Stage,
        /// Classified failure
        error: ClassifiedError,
    },

    /// Every provider of the stage was skipped or failed
    #[error("all {stage} providers failed: {}", describe_attempts(.attempts))]
    Exhausted {
        /// Exhausted stage
        stage: Stage,
        /// One record per provider, in priority order
        attempts: Vec<ProviderAttempt>,
    },
}

fn describe_attempts(attempts: &[ProviderAttempt]) -> String {
    if attempts.is_empty() {
        return "no providers registered".to_string();
    }
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl PipelineError {
    /// Create a validation error
    pub fn validation(stage: Stage, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            stage,
            field: field.into(),
            message: message.into(),
        }
    }

    /// Stage the error happened in
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Validation { stage, .. }
            | Self::Provider { stage, .. }
            | Self::Exhausted { stage, .. } => *stage,
        }
    }

    /// Terminal pipeline state for this error
    #[must_use]
    pub const fn failed_state(&self) -> PipelineState {
        PipelineState::Failed(self.stage())
    }

    /// Whether the input was rejected before any provider call
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Offending field of a validation error
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<ChainError> for PipelineError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::Exhausted { stage, attempts } => Self::Exhausted { stage, attempts },
        }
    }
}

#[cfg(test)]
mod tests {
    use resilience::{AttemptOutcome, SkipReason};

    use super::*;

    fn classified(provider: &str) -> ClassifiedError {
        ClassifiedError {
            fallback_worthy: true,
            stage: Stage::Tts,
            provider: provider.to_string(),
            message: "HTTP 503: overloaded".to_string(),
            status: Some(503),
        }
    }

    #[test]
    fn validation_reports_stage_and_field() {
        let err = PipelineError::validation(Stage::Stt, "audio", "audio buffer is empty");
        assert_eq!(err.stage(), Stage::Stt);
        assert_eq!(err.field(), Some("audio"));
        assert!(err.is_validation());
        assert_eq!(err.failed_state(), PipelineState::Failed(Stage::Stt));
        assert_eq!(err.to_string(), "invalid audio for stt: audio buffer is empty");
    }

    #[test]
    fn provider_error_displays_classified_failure() {
        let err = PipelineError::Provider {
            stage: Stage::Tts,
            error: classified("openai-tts"),
        };
        assert_eq!(err.failed_state(), PipelineState::Failed(Stage::Tts));
        assert!(err.to_string().contains("openai-tts"));
        assert!(err.field().is_none());
    }

    #[test]
    fn chain_exhaustion_converts() {
        let chain_err = ChainError::Exhausted {
            stage: Stage::Translation,
            attempts: vec![
                ProviderAttempt {
                    provider: "openai".to_string(),
                    outcome: AttemptOutcome::Skipped(SkipReason::NotConfigured),
                },
                ProviderAttempt {
                    provider: "mymemory".to_string(),
                    outcome: AttemptOutcome::Failed(classified("mymemory")),
                },
            ],
        };

        let err = PipelineError::from(chain_err);
        assert_eq!(err.stage(), Stage::Translation);
        let text = err.to_string();
        assert!(text.starts_with("all translation providers failed: "));
        assert!(text.contains("openai: skipped (not configured)"));
        assert!(text.contains("mymemory"));
    }

    #[test]
    fn empty_exhaustion_mentions_no_providers() {
        let err = PipelineError::Exhausted {
            stage: Stage::Stt,
            attempts: vec![],
        };
        assert_eq!(err.to_string(), "all stt providers failed: no providers registered");
    }
}
