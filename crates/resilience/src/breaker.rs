//! Per-provider circuit breaker with exponential cooldown
//!
//! Unlike a classic three-state breaker, a provider is marked down after a
//! single classified failure. It stays down until a real call succeeds, but
//! becomes eligible for a probe call once its cooldown has elapsed:
//!
//! ```text
//! cooldown(n) = min(base * 2^(n-1), cap)
//! ```
//!
//! where `n` is the number of consecutive failures.
//!
//! # Example
//!
//! ```
//! use resilience::{BreakerConfig, CircuitBreaker};
//!
//! let breaker = CircuitBreaker::new("openai-whisper", BreakerConfig::default());
//! assert!(breaker.should_attempt());
//! ```

use std::{fmt, time::Duration};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Cooldown parameters for a breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// Cooldown after the first failure in milliseconds (default: 300000ms = 5min)
    #[serde(default = "default_cooldown_base_ms")]
    pub cooldown_base_ms: u64,

    /// Upper bound for the cooldown in milliseconds (default: 1500000ms = 25min)
    #[serde(default = "default_cooldown_cap_ms")]
    pub cooldown_cap_ms: u64,
}

const fn default_cooldown_base_ms() -> u64 {
    300_000
}

const fn default_cooldown_cap_ms() -> u64 {
    1_500_000
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            cooldown_base_ms: default_cooldown_base_ms(),
            cooldown_cap_ms: default_cooldown_cap_ms(),
        }
    }
}

impl BreakerConfig {
    /// Creates a custom configuration
    #[must_use]
    pub const fn new(cooldown_base_ms: u64, cooldown_cap_ms: u64) -> Self {
        Self {
            cooldown_base_ms,
            cooldown_cap_ms,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.cooldown_base_ms == 0 {
            return Err("cooldown_base_ms must be greater than zero".to_string());
        }
        if self.cooldown_cap_ms < self.cooldown_base_ms {
            return Err(format!(
                "cooldown_cap_ms ({}) must not be below cooldown_base_ms ({})",
                self.cooldown_cap_ms, self.cooldown_base_ms
            ));
        }
        Ok(())
    }

    /// Cooldown in force after `failures` consecutive failures
    ///
    /// ```
    /// use std::time::Duration;
    /// use resilience::BreakerConfig;
    ///
    /// let config = BreakerConfig::default();
    /// assert_eq!(config.cooldown_for(1), Duration::from_millis(300_000));
    /// assert_eq!(config.cooldown_for(3), Duration::from_millis(1_200_000));
    /// assert_eq!(config.cooldown_for(4), Duration::from_millis(1_500_000));
    /// ```
    #[must_use]
    pub fn cooldown_for(&self, failures: u32) -> Duration {
        if failures == 0 {
            return Duration::ZERO;
        }
        let factor = 1u64.checked_shl(failures - 1).unwrap_or(u64::MAX);
        let millis = self
            .cooldown_base_ms
            .saturating_mul(factor)
            .min(self.cooldown_cap_ms);
        Duration::from_millis(millis)
    }
}

/// Point-in-time view of a breaker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakerSnapshot {
    /// Provider name
    pub name: String,
    /// Whether the last call failed with a classified error
    pub is_down: bool,
    /// Consecutive classified failures
    pub failure_count: u32,
    /// Time until the provider becomes eligible again, zero when eligible
    pub cooldown_remaining: Duration,
}

#[derive(Debug, Default)]
struct BreakerState {
    is_down: bool,
    failure_count: u32,
    last_failure_at: Option<Instant>,
}

/// Health tracker for a single provider
///
/// Each operation is atomic. The check/invoke/record sequence performed by
/// a chain is not, so two concurrent calls may both probe a recovering
/// provider.
pub struct CircuitBreaker {
    name: String,
    config: BreakerConfig,
    state: Mutex<BreakerState>,
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("is_down", &state.is_down)
            .field("failure_count", &state.failure_count)
            .finish_non_exhaustive()
    }
}

impl CircuitBreaker {
    /// Creates a breaker in the healthy state
    #[must_use]
    pub fn new(name: impl Into<String>, config: BreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            state: Mutex::new(BreakerState::default()),
        }
    }

    /// Returns the provider name this breaker guards
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the cooldown configuration
    #[must_use]
    pub const fn config(&self) -> &BreakerConfig {
        &self.config
    }

    /// Cooldown in force after `failures` consecutive failures
    #[must_use]
    pub fn cooldown_for(&self, failures: u32) -> Duration {
        self.config.cooldown_for(failures)
    }

    /// Whether the provider may be called now
    ///
    /// A down provider becomes eligible again once its cooldown has elapsed.
    /// Eligibility does not clear the down flag; only a success does.
    #[must_use]
    pub fn should_attempt(&self) -> bool {
        let state = self.state.lock();
        if !state.is_down {
            return true;
        }
        let Some(last_failure_at) = state.last_failure_at else {
            return true;
        };

        let eligible = last_failure_at.elapsed() >= self.cooldown_for(state.failure_count);
        if eligible {
            tracing::debug!(
                provider = %self.name,
                failures = state.failure_count,
                "Cooldown elapsed, allowing probe call"
            );
        }
        eligible
    }

    /// Records a successful call
    pub fn record_success(&self) {
        let mut state = self.state.lock();
        if state.is_down {
            tracing::info!(
                provider = %self.name,
                failures = state.failure_count,
                "Provider recovered"
            );
        }
        *state = BreakerState::default();
    }

    /// Records a classified failure
    pub fn record_failure(&self) {
        let mut state = self.state.lock();
        state.failure_count = state.failure_count.saturating_add(1);
        state.last_failure_at = Some(Instant::now());
        state.is_down = true;

        let cooldown = self.cooldown_for(state.failure_count);
        tracing::warn!(
            provider = %self.name,
            failures = state.failure_count,
            cooldown_ms = u64::try_from(cooldown.as_millis()).unwrap_or(u64::MAX),
            "Provider marked down"
        );
    }

    /// Returns the breaker to its initial state
    pub fn reset(&self) {
        *self.state.lock() = BreakerState::default();
        tracing::debug!(provider = %self.name, "Breaker reset");
    }

    /// Returns a point-in-time view of the breaker
    #[must_use]
    pub fn snapshot(&self) -> BreakerSnapshot {
        let state = self.state.lock();
        let cooldown_remaining = match (state.is_down, state.last_failure_at) {
            (true, Some(at)) => self
                .cooldown_for(state.failure_count)
                .saturating_sub(at.elapsed()),
            _ => Duration::ZERO,
        };

        BreakerSnapshot {
            name: self.name.clone(),
            is_down: state.is_down,
            failure_count: state.failure_count,
            cooldown_remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker() -> CircuitBreaker {
        CircuitBreaker::new("test-provider", BreakerConfig::default())
    }

    #[test]
    fn config_default() {
        let config = BreakerConfig::default();
        assert_eq!(config.cooldown_base_ms, 300_000);
        assert_eq!(config.cooldown_cap_ms, 1_500_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_validation() {
        assert!(BreakerConfig::new(0, 10).validate().is_err());
        assert!(BreakerConfig::new(100, 50).validate().is_err());
        assert!(BreakerConfig::new(100, 100).validate().is_ok());
    }

    #[test]
    fn config_deserialization_uses_defaults() {
        let config: BreakerConfig = serde_json::from_str(r#"{"cooldown_base_ms":1000}"#).unwrap();
        assert_eq!(config.cooldown_base_ms, 1000);
        assert_eq!(config.cooldown_cap_ms, 1_500_000);
    }

    #[test]
    fn cooldown_doubles_until_cap() {
        let config = BreakerConfig::default();
        assert_eq!(config.cooldown_for(0), Duration::ZERO);
        assert_eq!(config.cooldown_for(1), Duration::from_millis(300_000));
        assert_eq!(config.cooldown_for(2), Duration::from_millis(600_000));
        assert_eq!(config.cooldown_for(3), Duration::from_millis(1_200_000));
        assert_eq!(config.cooldown_for(4), Duration::from_millis(1_500_000));
        assert_eq!(config.cooldown_for(200), Duration::from_millis(1_500_000));
    }

    #[test]
    fn cooldown_saturates_on_huge_base() {
        let config = BreakerConfig::new(u64::MAX / 2, u64::MAX);
        assert_eq!(config.cooldown_for(5), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn breaker_debug() {
        let debug = format!("{:?}", breaker());
        assert!(debug.contains("CircuitBreaker"));
        assert!(debug.contains("test-provider"));
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_breaker_allows_attempts() {
        let b = breaker();
        assert!(b.should_attempt());
        let snap = b.snapshot();
        assert!(!snap.is_down);
        assert_eq!(snap.failure_count, 0);
        assert_eq!(snap.cooldown_remaining, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn single_failure_blocks_for_base_cooldown() {
        let b = breaker();
        b.record_failure();
        assert!(!b.should_attempt());

        tokio::time::advance(Duration::from_millis(299_999)).await;
        assert!(!b.should_attempt());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(b.should_attempt());
    }

    #[tokio::test(start_paused = true)]
    async fn three_failures_need_longer_cooldown() {
        let b = breaker();
        b.record_failure();
        b.record_failure();
        b.record_failure();

        tokio::time::advance(Duration::from_millis(1_199_999)).await;
        assert!(!b.should_attempt());
        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(b.should_attempt());
    }

    #[tokio::test(start_paused = true)]
    async fn eligibility_does_not_clear_down_flag() {
        let b = breaker();
        b.record_failure();
        tokio::time::advance(Duration::from_millis(300_000)).await;
        assert!(b.should_attempt());

        let snap = b.snapshot();
        assert!(snap.is_down);
        assert_eq!(snap.failure_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn success_resets_failure_count() {
        let b = breaker();
        for _ in 0..5 {
            b.record_failure();
        }
        b.record_success();

        assert!(b.should_attempt());
        let snap = b.snapshot();
        assert!(!snap.is_down);
        assert_eq!(snap.failure_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_reports_remaining_cooldown() {
        let b = breaker();
        b.record_failure();
        tokio::time::advance(Duration::from_millis(100_000)).await;
        assert_eq!(b.snapshot().cooldown_remaining, Duration::from_millis(200_000));
    }

    #[tokio::test(start_paused = true)]
    async fn reset_returns_to_initial_state() {
        let b = breaker();
        b.record_failure();
        b.reset();
        assert!(b.should_attempt());
        assert_eq!(b.snapshot().failure_count, 0);
    }
}
