//! Ordered provider fallback chain
//!
//! A chain tries its providers in configured order. Unconfigured providers
//! and providers whose breaker is cooling down are skipped. The first
//! success wins; if every provider is skipped or fails the chain returns
//! [`ChainError::Exhausted`] with one record per provider.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use domain::Stage;
use tracing::{debug, instrument, warn};

use crate::{
    breaker::{BreakerConfig, BreakerSnapshot, CircuitBreaker},
    classifier::ErrorClassifier,
    error::{AttemptOutcome, ChainError, ProviderAttempt, ProviderFailure, SkipReason},
};

/// One vendor implementation of a pipeline stage
#[async_trait]
pub trait Provider<I: ?Sized, O>: Send + Sync {
    /// Stable provider name used in logs, metrics and breaker lookup
    fn name(&self) -> &str;

    /// Whether the provider has what it needs to be called
    ///
    /// Computed once when the provider is built.
    fn is_configured(&self) -> bool {
        true
    }

    /// Call the provider
    async fn invoke(&self, input: &I) -> Result<O, ProviderFailure>;
}

struct ChainLink<I: ?Sized, O> {
    provider: Arc<dyn Provider<I, O>>,
    breaker: CircuitBreaker,
}

/// Ordered list of providers for one stage, each with its own breaker
pub struct ProviderChain<I: ?Sized, O> {
    stage: Stage,
    breaker_config: BreakerConfig,
    classifier: Arc<ErrorClassifier>,
    links: Vec<ChainLink<I, O>>,
}

impl<I: ?Sized, O> fmt::Debug for ProviderChain<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderChain")
            .field("stage", &self.stage)
            .field(
                "providers",
                &self
                    .links
                    .iter()
                    .map(|link| link.breaker.name())
                    .collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl<I, O> ProviderChain<I, O>
where
    I: ?Sized + Sync,
    O: Send,
{
    /// Creates an empty chain
    #[must_use]
    pub fn new(
        stage: Stage,
        breaker_config: BreakerConfig,
        classifier: Arc<ErrorClassifier>,
    ) -> Self {
        Self {
            stage,
            breaker_config,
            classifier,
            links: Vec::new(),
        }
    }

    /// Appends a provider with a fresh breaker
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn Provider<I, O>>) -> Self {
        self.push(provider);
        self
    }

    /// Appends a provider with a fresh breaker
    pub fn push(&mut self, provider: Arc<dyn Provider<I, O>>) {
        let breaker = CircuitBreaker::new(provider.name(), self.breaker_config);
        self.links.push(ChainLink { provider, breaker });
    }

    /// Stage served by this chain
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Provider names in priority order
    pub fn provider_names(&self) -> Vec<&str> {
        self.links.iter().map(|link| link.provider.name()).collect()
    }

    /// Number of registered providers
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether no provider is registered
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Breaker of the named provider
    pub fn breaker(&self, name: &str) -> Option<&CircuitBreaker> {
        self.links
            .iter()
            .find(|link| link.provider.name() == name)
            .map(|link| &link.breaker)
    }

    /// Snapshots of every breaker in priority order
    pub fn snapshots(&self) -> Vec<BreakerSnapshot> {
        self.links.iter().map(|link| link.breaker.snapshot()).collect()
    }

    /// Resets every breaker
    pub fn reset(&self) {
        for link in &self.links {
            link.breaker.reset();
        }
    }

    /// Run the input through the first available provider
    #[instrument(skip(self, input), fields(stage = %self.stage))]
    pub async fn attempt(&self, input: &I) -> Result<O, ChainError> {
        let mut attempts = Vec::with_capacity(self.links.len());

        for link in &self.links {
            let name = link.provider.name();

            if !link.provider.is_configured() {
                debug!(provider = %name, "Skipping unconfigured provider");
                self.record_metric(name, "not_configured");
                attempts.push(ProviderAttempt {
                    provider: name.to_string(),
                    outcome: AttemptOutcome::Skipped(SkipReason::NotConfigured),
                });
                continue;
            }

            if !link.breaker.should_attempt() {
                debug!(provider = %name, "Skipping provider in cooldown");
                self.record_metric(name, "cooling_down");
                attempts.push(ProviderAttempt {
                    provider: name.to_string(),
                    outcome: AttemptOutcome::Skipped(SkipReason::CoolingDown),
                });
                continue;
            }

            match link.provider.invoke(input).await {
                Ok(output) => {
                    link.breaker.record_success();
                    self.record_metric(name, "success");
                    debug!(provider = %name, "Provider succeeded");
                    return Ok(output);
                },
                Err(failure) => {
                    let classified = self.classifier.classify_failure(self.stage, name, failure);
                    if classified.fallback_worthy {
                        link.breaker.record_failure();
                    }
                    self.record_metric(name, "failure");
                    warn!(
                        provider = %name,
                        fallback_worthy = classified.fallback_worthy,
                        status = ?classified.status,
                        error = %classified.message,
                        "Provider failed, trying next"
                    );
                    attempts.push(ProviderAttempt {
                        provider: name.to_string(),
                        outcome: AttemptOutcome::Failed(classified),
                    });
                },
            }
        }

        warn!(attempts = attempts.len(), "All providers exhausted");
        Err(ChainError::Exhausted {
            stage: self.stage,
            attempts,
        })
    }

    fn record_metric(&self, provider: &str, outcome: &'static str) {
        metrics::counter!(
            "relay_provider_attempts_total",
            "stage" => self.stage.as_str(),
            "provider" => provider.to_string(),
            "outcome" => outcome
        )
        .increment(1);
    }
}
