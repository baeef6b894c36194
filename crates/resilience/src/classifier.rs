//! Failure classification
//!
//! Decides whether a provider failure is systemic (bad credentials, quota,
//! outage, network trouble) and should therefore count against the
//! provider's breaker, or is specific to the request at hand.

use std::{collections::HashSet, sync::LazyLock};

use aho_corasick::AhoCorasick;
use domain::Stage;
use serde::{Deserialize, Serialize};

use crate::error::{ClassifiedError, ProviderFailure};

/// Status codes that indicate a systemic provider problem
const DEFAULT_STATUS_CODES: &[u16] = &[401, 402, 403, 429, 500, 502, 503, 504];

/// Message fragments that indicate a systemic provider problem
const DEFAULT_KEYWORDS: &[&str] = &[
    "rate limit",
    "quota",
    "billing",
    "unauthorized",
    "invalid api key",
    "timeout",
    "timed out",
    "service unavailable",
    "network error",
    "connection refused",
    "connection failed",
];

static DEFAULT_MATCHER: LazyLock<AhoCorasick> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // Infallible with valid static patterns
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(DEFAULT_KEYWORDS)
        .expect("Failed to build keyword matcher")
});

/// Classifier configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// HTTP statuses that trip the breaker
    #[serde(default = "default_status_codes")]
    pub fallback_status_codes: Vec<u16>,

    /// Case-insensitive message fragments that trip the breaker
    #[serde(default = "default_keywords")]
    pub fallback_keywords: Vec<String>,
}

fn default_status_codes() -> Vec<u16> {
    DEFAULT_STATUS_CODES.to_vec()
}

fn default_keywords() -> Vec<String> {
    DEFAULT_KEYWORDS.iter().map(ToString::to_string).collect()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            fallback_status_codes: default_status_codes(),
            fallback_keywords: default_keywords(),
        }
    }
}

impl ClassifierConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if let Some(code) = self
            .fallback_status_codes
            .iter()
            .find(|code| !(100..=599).contains(*code))
        {
            return Err(format!("fallback status code {code} is not a valid HTTP status"));
        }
        if self.fallback_keywords.iter().any(|k| k.trim().is_empty()) {
            return Err("fallback keywords must not be empty".to_string());
        }
        Ok(())
    }
}

/// Maps raw provider failures to [`ClassifiedError`]s
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    status_codes: HashSet<u16>,
    matcher: AhoCorasick,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self {
            status_codes: DEFAULT_STATUS_CODES.iter().copied().collect(),
            matcher: DEFAULT_MATCHER.clone(),
        }
    }
}

impl ErrorClassifier {
    /// Build a classifier from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the keyword automaton cannot be built.
    pub fn new(config: &ClassifierConfig) -> Result<Self, aho_corasick::BuildError> {
        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&config.fallback_keywords)?;

        Ok(Self {
            status_codes: config.fallback_status_codes.iter().copied().collect(),
            matcher,
        })
    }

    /// Whether the failure should fail over and penalize the provider
    #[must_use]
    pub fn is_fallback_worthy(&self, failure: &ProviderFailure) -> bool {
        if failure
            .status
            .is_some_and(|status| self.status_codes.contains(&status))
        {
            return true;
        }
        self.matcher.is_match(&failure.message)
    }

    /// Classify a failure reported by `provider` for `stage`
    #[must_use]
    pub fn classify_failure(
        &self,
        stage: Stage,
        provider: &str,
        failure: ProviderFailure,
    ) -> ClassifiedError {
        ClassifiedError {
            fallback_worthy: self.is_fallback_worthy(&failure),
            stage,
            provider: provider.to_string(),
            message: failure.message,
            status: failure.status,
        }
    }
}
