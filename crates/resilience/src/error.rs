//! Failure and attempt records shared by every provider chain

use std::fmt;

use domain::Stage;
use thiserror::Error;

/// Raw failure reported by a provider adapter
///
/// Adapters convert their vendor-specific errors into this shape so the
/// classifier only ever has to look at an optional HTTP status and a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    /// HTTP-like status code, when the vendor returned one
    pub status: Option<u16>,
    /// Human-readable failure message
    pub message: String,
}

impl ProviderFailure {
    /// Failure without a status code
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// Failure carrying an HTTP status
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {status}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ProviderFailure {}

/// A provider failure after classification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{stage} provider '{provider}' failed: {message}")]
pub struct ClassifiedError {
    /// Whether the failure counts against the provider's breaker
    pub fallback_worthy: bool,
    /// Stage the provider serves
    pub stage: Stage,
    /// Provider name
    pub provider: String,
    /// Failure message
    pub message: String,
    /// HTTP status, if any
    pub status: Option<u16>,
}

/// Why a provider was not invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Missing credentials or endpoint
    NotConfigured,
    /// Breaker is down and its cooldown has not elapsed
    CoolingDown,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "not configured"),
            Self::CoolingDown => write!(f, "cooling down"),
        }
    }
}

/// Result of one provider slot in a failed chain run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Provider was not called
    Skipped(SkipReason),
    /// Provider was called and failed
    Failed(ClassifiedError),
}

/// One entry per provider in an exhausted chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderAttempt {
    /// Provider name
    pub provider: String,
    /// What happened
    pub outcome: AttemptOutcome,
}

impl fmt::Display for ProviderAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            AttemptOutcome::Skipped(reason) => write!(f, "{}: skipped ({reason})", self.provider),
            AttemptOutcome::Failed(err) => write!(f, "{}: {}", self.provider, err.message),
        }
    }
}

/// Errors returned by [`ProviderChain::attempt`](crate::ProviderChain::attempt)
#[derive(Debug, Clone, Error)]
pub enum ChainError {
    /// Every provider was skipped or failed
    #[error("all {stage} providers failed: {}", format_attempts(.attempts))]
    Exhausted {
        /// Stage of the chain
        stage: Stage,
        /// One entry per provider, in chain order
        attempts: Vec<ProviderAttempt>,
    },
}

impl ChainError {
    /// Stage of the failed chain
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Exhausted { stage, .. } => *stage,
        }
    }

    /// Per-provider attempt records
    pub fn attempts(&self) -> &[ProviderAttempt] {
        match self {
            Self::Exhausted { attempts, .. } => attempts,
        }
    }

    /// The last provider error, if any provider was actually called
    pub fn last_failure(&self) -> Option<&ClassifiedError> {
        self.attempts()
            .iter()
            .rev()
            .find_map(|attempt| match &attempt.outcome {
                AttemptOutcome::Failed(err) => Some(err),
                AttemptOutcome::Skipped(_) => None,
            })
    }
}

fn format_attempts(attempts: &[ProviderAttempt]) -> String {
    if attempts.is_empty() {
        return "no providers registered".to_string();
    }
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
