//! Application configuration
//!
//! Split into focused sub-modules:
//! - `resilience`: breaker cooldowns per stage, failure classifier
//! - `tts_cache`: synthesized audio cache backend, TTL and sweep period
//!
//! Vendor sections reuse the config types of the adapter crates.
//!
//! Sources, later ones win:
//! 1. built-in defaults
//! 2. `config.toml` (or an explicit file)
//! 3. `RELAY_*` environment variables, `__` between nesting levels
//!    (e.g. `RELAY_SPEECH__OPENAI_API_KEY`)

mod resilience;
mod tts_cache;

use std::path::Path;

use ai_speech::SpeechConfig;
use ai_translation::TranslationConfig;
use config::ConfigError;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use self::resilience::ResilienceAppConfig;
pub use tts_cache::{CacheBackend, TtsCacheConfig};

use crate::telemetry::TelemetryConfig;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "RELAY";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Speech-to-text, synthesis and voice isolation vendors
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Translation vendors
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Breakers and failure classification
    #[serde(default)]
    pub resilience: ResilienceAppConfig,

    /// Synthesized audio cache
    #[serde(default)]
    pub tts_cache: TtsCacheConfig,

    /// Logging
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from `config.toml` (if present) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from an explicit file (required if given) and the
    /// environment
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("config").required(false),
        };

        let builder = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.share_openai_key();
        config.validate()?;

        debug!(
            stt_openai = config.speech.has_openai_key(),
            translation_openai = config.translation.has_openai_key(),
            cache = %config.tts_cache.backend,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Use the speech OpenAI key for translation when only one is set
    fn share_openai_key(&mut self) {
        if self.translation.openai_api_key.is_none() && self.speech.openai_api_key.is_some() {
            self.translation
                .openai_api_key
                .clone_from(&self.speech.openai_api_key);
        }
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sections: [(&str, Result<(), String>); 5] = [
            ("speech", self.speech.validate()),
            ("translation", self.translation.validate()),
            ("resilience", self.resilience.validate()),
            ("tts_cache", self.tts_cache.validate()),
            ("telemetry", self.telemetry.validate()),
        ];

        let errors: Vec<String> = sections
            .into_iter()
            .filter_map(|(name, result)| result.err().map(|e| format!("{name}: {e}")))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use ::resilience::BreakerConfig;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tts_cache.backend, CacheBackend::File);
        assert_eq!(config.resilience.stt, BreakerConfig::default());
    }

    #[test]
    fn loads_sections_from_file() {
        let file = write_config(
            r#"
            [speech]
            openai_api_key = "sk-speech"

            [translation.mymemory]
            max_chars = 300

            [resilience.translation]
            cooldown_base_ms = 1000
            cooldown_cap_ms = 4000

            [tts_cache]
            backend = "memory"

            [telemetry]
            json = true
            "#,
        );

        let config = AppConfig::load_from(Some(file.path())).unwrap();

        assert_eq!(config.speech.openai_api_key.as_deref(), Some("sk-speech"));
        assert_eq!(config.translation.mymemory.max_chars, 300);
        assert_eq!(config.resilience.translation, BreakerConfig::new(1000, 4000));
        assert_eq!(config.tts_cache.backend, CacheBackend::Memory);
        assert!(config.telemetry.json);
    }

    #[test]
    fn speech_key_is_shared_with_translation() {
        let file = write_config(
            r#"
            [speech]
            openai_api_key = "sk-shared"
            "#,
        );

        let config = AppConfig::load_from(Some(file.path())).unwrap();

        assert_eq!(
            config.translation.openai_api_key.as_deref(),
            Some("sk-shared")
        );
    }

    #[test]
    fn invalid_sections_are_all_reported() {
        let file = write_config(
            r#"
            [tts_cache]
            ttl_secs = 0

            [resilience.stt]
            cooldown_base_ms = 0
            "#,
        );

        let err = AppConfig::load_from(Some(file.path())).unwrap_err().to_string();

        assert!(err.contains("tts_cache: ttl_secs"), "{err}");
        assert!(err.contains("resilience: stt:"), "{err}");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let missing = Path::new("/nonexistent/relay/config.toml");
        assert!(AppConfig::load_from(Some(missing)).is_err());
    }
}
