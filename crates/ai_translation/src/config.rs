//! Configuration for translation adapters

use resilience::RetryConfig;
use serde::{Deserialize, Serialize};

/// Configuration for all translation providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// OpenAI API key
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// OpenAI API base URL (for custom endpoints)
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    /// Chat model used for translation
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature (0.0 - 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// MyMemory settings
    #[serde(default)]
    pub mymemory: MyMemoryConfig,
}

/// MyMemory public API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MyMemoryConfig {
    /// API base URL
    #[serde(default = "default_mymemory_base_url")]
    pub base_url: String,

    /// Contact email; raises the anonymous daily quota
    #[serde(default)]
    pub email: Option<String>,

    /// Longest input sent to the API, in characters
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Retry policy for transient failures
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

const fn default_temperature() -> f32 {
    0.3
}

const fn default_timeout_ms() -> u64 {
    15000
}

fn default_mymemory_base_url() -> String {
    "https://api.mymemory.translated.net".to_string()
}

const fn default_max_chars() -> usize {
    500
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: default_openai_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_ms: default_timeout_ms(),
            mymemory: MyMemoryConfig::default(),
        }
    }
}

impl Default for MyMemoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_mymemory_base_url(),
            email: None,
            max_chars: default_max_chars(),
            retry: RetryConfig::default(),
        }
    }
}

impl TranslationConfig {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            ));
        }

        if self.timeout_ms == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }

        if self.mymemory.max_chars == 0 {
            return Err("MyMemory max_chars must be greater than 0".to_string());
        }

        self.mymemory
            .retry
            .validate()
            .map_err(|e| format!("MyMemory retry: {e}"))
    }

    /// Whether OpenAI credentials are present
    #[must_use]
    pub fn has_openai_key(&self) -> bool {
        self.openai_api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }
}
