//! Resilience primitives for multi-provider speech stages
//!
//! Every pipeline stage (speech-to-text, translation, synthesis) can be served
//! by several vendors. This crate holds the pieces that decide which vendor
//! to call:
//!
//! - [`CircuitBreaker`]: per-provider health with exponential cooldown
//! - [`ErrorClassifier`]: decides whether a failure should penalize a provider
//! - [`ProviderChain`]: ordered providers, first success wins
//! - [`retry`]: bounded retry with backoff for use inside a single provider

pub mod breaker;
pub mod chain;
pub mod classifier;
pub mod error;
pub mod retry;

pub use breaker::{BreakerConfig, BreakerSnapshot, CircuitBreaker};
pub use chain::{Provider, ProviderChain};
pub use classifier::{ClassifierConfig, ErrorClassifier};
pub use error::{
    AttemptOutcome, ChainError, ClassifiedError, ProviderAttempt, ProviderFailure, SkipReason,
};
pub use retry::{RetryConfig, RetryResult, Retryable, with_retry};
