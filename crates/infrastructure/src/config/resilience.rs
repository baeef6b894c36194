//! Breaker and classifier settings per pipeline stage

use resilience::{BreakerConfig, ClassifierConfig};
use serde::{Deserialize, Serialize};

/// Resilience configuration
///
/// TTS has no fallback chain, so only the STT and translation stages carry
/// breaker settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResilienceAppConfig {
    /// Breaker cooldowns for speech-to-text providers
    #[serde(default)]
    pub stt: BreakerConfig,

    /// Breaker cooldowns for translation providers
    #[serde(default)]
    pub translation: BreakerConfig,

    /// Which failures count against a provider
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

impl ResilienceAppConfig {
    /// Validate every stage
    pub fn validate(&self) -> Result<(), String> {
        self.stt.validate().map_err(|e| format!("stt: {e}"))?;
        self.translation
            .validate()
            .map_err(|e| format!("translation: {e}"))?;
        self.classifier
            .validate()
            .map_err(|e| format!("classifier: {e}"))
    }
}
