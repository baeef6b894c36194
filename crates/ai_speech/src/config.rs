//! Configuration for speech processing

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::AudioFormat;

/// Configuration for all speech providers
///
/// Vendors without credentials stay in the chain but report themselves as
/// not configured, so a missing key is not a configuration error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// OpenAI API key (Whisper STT and TTS)
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// OpenAI API base URL (for custom endpoints)
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    /// Speech-to-text model
    #[serde(default = "default_stt_model")]
    pub stt_model: String,

    /// Text-to-speech model
    #[serde(default = "default_tts_model")]
    pub tts_model: String,

    /// Default voice for TTS
    #[serde(default = "default_voice")]
    pub default_voice: String,

    /// Output audio format for TTS
    #[serde(default = "default_output_format")]
    pub output_format: AudioFormat,

    /// Format of audio arriving from speakers
    #[serde(default = "default_input_format")]
    pub input_format: AudioFormat,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum audio duration in milliseconds
    #[serde(default = "default_max_audio_duration_ms")]
    pub max_audio_duration_ms: u64,

    /// Default TTS speaking speed (0.25 to 4.0)
    #[serde(default = "default_speed")]
    pub speed: f32,

    /// Deepgram settings
    #[serde(default)]
    pub deepgram: DeepgramConfig,

    /// Local whisper.cpp settings
    #[serde(default)]
    pub whisper_cpp: WhisperCppConfig,

    /// ElevenLabs voice isolation settings
    #[serde(default)]
    pub elevenlabs: ElevenLabsConfig,
}

/// Deepgram pre-recorded transcription settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepgramConfig {
    /// API key
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL
    #[serde(default = "default_deepgram_base_url")]
    pub base_url: String,

    /// Transcription model
    #[serde(default = "default_deepgram_model")]
    pub model: String,
}

/// Local whisper.cpp CLI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppConfig {
    /// Path to the whisper.cpp executable
    #[serde(default = "default_whisper_executable")]
    pub executable_path: PathBuf,

    /// Path to the GGML model file
    #[serde(default = "default_whisper_model")]
    pub model_path: PathBuf,

    /// Number of threads
    #[serde(default = "default_threads")]
    pub threads: u32,

    /// Language used when the request carries no hint
    #[serde(default)]
    pub default_language: Option<String>,
}

/// ElevenLabs audio isolation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElevenLabsConfig {
    /// API key
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL
    #[serde(default = "default_elevenlabs_base_url")]
    pub base_url: String,

    /// Whether to isolate voice before the last STT provider
    #[serde(default = "default_true")]
    pub enhance_before_fallback: bool,
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_stt_model() -> String {
    "whisper-1".to_string()
}

fn default_tts_model() -> String {
    "tts-1".to_string()
}

fn default_voice() -> String {
    "nova".to_string()
}

const fn default_output_format() -> AudioFormat {
    AudioFormat::Mp3
}

const fn default_input_format() -> AudioFormat {
    AudioFormat::Webm
}

const fn default_timeout_ms() -> u64 {
    30000 // 30 seconds
}

const fn default_max_audio_duration_ms() -> u64 {
    120_000 // 2 minutes
}

const fn default_speed() -> f32 {
    1.0
}

fn default_deepgram_base_url() -> String {
    "https://api.deepgram.com/v1".to_string()
}

fn default_deepgram_model() -> String {
    "nova-2".to_string()
}

fn default_whisper_executable() -> PathBuf {
    PathBuf::from("whisper-cli")
}

fn default_whisper_model() -> PathBuf {
    PathBuf::from("models/ggml-base.bin")
}

const fn default_threads() -> u32 {
    4
}

fn default_elevenlabs_base_url() -> String {
    "https://api.elevenlabs.io/v1".to_string()
}

const fn default_true() -> bool {
    true
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: default_openai_base_url(),
            stt_model: default_stt_model(),
            tts_model: default_tts_model(),
            default_voice: default_voice(),
            output_format: default_output_format(),
            input_format: default_input_format(),
            timeout_ms: default_timeout_ms(),
            max_audio_duration_ms: default_max_audio_duration_ms(),
            speed: default_speed(),
            deepgram: DeepgramConfig::default(),
            whisper_cpp: WhisperCppConfig::default(),
            elevenlabs: ElevenLabsConfig::default(),
        }
    }
}

impl Default for DeepgramConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_deepgram_base_url(),
            model: default_deepgram_model(),
        }
    }
}

impl Default for WhisperCppConfig {
    fn default() -> Self {
        Self {
            executable_path: default_whisper_executable(),
            model_path: default_whisper_model(),
            threads: default_threads(),
            default_language: None,
        }
    }
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_elevenlabs_base_url(),
            enhance_before_fallback: default_true(),
        }
    }
}

/// Whether an optional credential holds a usable value
pub(crate) fn has_key(key: Option<&str>) -> bool {
    key.is_some_and(|k| !k.trim().is_empty())
}

impl SpeechConfig {
    /// Create a minimal config for testing
    #[cfg(test)]
    pub fn test() -> Self {
        Self {
            openai_api_key: Some("test-key".to_string()),
            ..Default::default()
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.25..=4.0).contains(&self.speed) {
            return Err(format!(
                "Speed must be between 0.25 and 4.0, got {}",
                self.speed
            ));
        }

        if self.timeout_ms == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }

        if self.max_audio_duration_ms == 0 {
            return Err("Max audio duration must be greater than 0".to_string());
        }

        if self.whisper_cpp.threads == 0 {
            return Err("whisper.cpp threads must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Whether OpenAI credentials are present
    #[must_use]
    pub fn has_openai_key(&self) -> bool {
        has_key(self.openai_api_key.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = SpeechConfig::default();

        assert!(config.openai_api_key.is_none());
        assert_eq!(config.openai_base_url, "https://api.openai.com/v1");
        assert_eq!(config.stt_model, "whisper-1");
        assert_eq!(config.tts_model, "tts-1");
        assert_eq!(config.default_voice, "nova");
        assert_eq!(config.output_format, AudioFormat::Mp3);
        assert_eq!(config.input_format, AudioFormat::Webm);
        assert_eq!(config.timeout_ms, 30000);
        assert_eq!(config.deepgram.model, "nova-2");
        assert_eq!(config.whisper_cpp.threads, 4);
        assert!(config.elevenlabs.enhance_before_fallback);
    }

    #[test]
    fn missing_keys_are_valid() {
        assert!(SpeechConfig::default().validate().is_ok());
        assert!(!SpeechConfig::default().has_openai_key());
        assert!(SpeechConfig::test().has_openai_key());
    }

    #[test]
    fn blank_key_counts_as_missing() {
        assert!(!has_key(Some("   ")));
        assert!(!has_key(None));
        assert!(has_key(Some("sk-1")));
    }

    #[test]
    fn validate_fails_with_invalid_speed() {
        let mut config = SpeechConfig::test();
        config.speed = 0.1;
        assert!(config.validate().is_err());

        config.speed = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_fails_with_zero_timeout() {
        let mut config = SpeechConfig::test();
        config.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_fails_with_zero_threads() {
        let mut config = SpeechConfig::test();
        config.whisper_cpp.threads = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_deserializes_from_toml() {
        let toml = r#"
            openai_api_key = "sk-test"
            tts_model = "tts-1-hd"
            default_voice = "alloy"
            output_format = "opus"
            timeout_ms = 60000

            [deepgram]
            api_key = "dg-test"
            model = "nova-3"

            [whisper_cpp]
            model_path = "/opt/whisper/ggml-small.bin"
            default_language = "fr"

            [elevenlabs]
            enhance_before_fallback = false
        "#;

        let config: SpeechConfig = toml::from_str(toml).unwrap();

        assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.tts_model, "tts-1-hd");
        assert_eq!(config.output_format, AudioFormat::Opus);
        assert_eq!(config.deepgram.api_key.as_deref(), Some("dg-test"));
        assert_eq!(config.deepgram.model, "nova-3");
        assert_eq!(
            config.whisper_cpp.model_path,
            PathBuf::from("/opt/whisper/ggml-small.bin")
        );
        assert_eq!(config.whisper_cpp.default_language.as_deref(), Some("fr"));
        assert!(!config.elevenlabs.enhance_before_fallback);
        assert_eq!(config.elevenlabs.base_url, "https://api.elevenlabs.io/v1");
    }
}
