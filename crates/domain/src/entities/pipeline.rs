//! Pipeline request and result
//!
//! One [`PipelineRequest`] describes a single utterance as it arrives from a
//! speaker: raw audio (or already transcribed text), the language pair and
//! how the listener wants to hear the translation.

use serde::{Deserialize, Serialize};

use crate::{errors::DomainError, value_objects::TtsServiceType};

/// Allowed synthesis speed range
pub const SPEED_RANGE: std::ops::RangeInclusive<f32> = 0.25..=4.0;

/// Caller-selected speech synthesis options
///
/// `service_type` is kept as the raw wire string so an unknown value can be
/// reported against the request field instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsOptions {
    /// Strategy name: `browser`, `cloud` or `silent`
    pub service_type: String,
    /// Explicit voice, wins over any emotion-derived voice
    #[serde(default)]
    pub voice: Option<String>,
    /// Playback speed multiplier
    #[serde(default)]
    pub speed: Option<f32>,
    /// Adapt voice and pacing to the emotional tone of the text
    #[serde(default)]
    pub preserve_emotions: bool,
}

impl TtsOptions {
    /// Options for the given strategy with everything else defaulted
    pub fn new(service_type: TtsServiceType) -> Self {
        Self {
            service_type: service_type.as_str().to_string(),
            voice: None,
            speed: None,
            preserve_emotions: false,
        }
    }

    /// Set an explicit voice
    #[must_use]
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    /// Set the playback speed
    #[must_use]
    pub const fn with_speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Enable emotion preservation
    #[must_use]
    pub const fn with_emotions(mut self, preserve: bool) -> Self {
        self.preserve_emotions = preserve;
        self
    }

    /// Parse the strategy name
    pub fn parsed_service_type(&self) -> Result<TtsServiceType, DomainError> {
        self.service_type.parse()
    }

    /// Validate the speed, if one was given
    pub fn validate_speed(&self) -> Result<(), DomainError> {
        match self.speed {
            Some(speed) if !SPEED_RANGE.contains(&speed) => Err(DomainError::InvalidSpeed(speed)),
            _ => Ok(()),
        }
    }
}

impl Default for TtsOptions {
    fn default() -> Self {
        Self::new(TtsServiceType::default())
    }
}

/// One utterance to run through the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRequest {
    /// Raw audio, may be empty when `pre_transcribed_text` is set
    #[serde(default)]
    pub audio: Vec<u8>,
    /// Language spoken by the speaker
    pub source_language: String,
    /// Language the listener wants
    pub target_language: String,
    /// Text already produced by the client, bypasses speech-to-text
    #[serde(default)]
    pub pre_transcribed_text: Option<String>,
    /// Synthesis options
    #[serde(default)]
    pub tts: TtsOptions,
}

impl PipelineRequest {
    /// Request carrying raw audio
    pub fn from_audio(
        audio: impl Into<Vec<u8>>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            audio: audio.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
            pre_transcribed_text: None,
            tts: TtsOptions::default(),
        }
    }

    /// Request carrying text transcribed by the client
    pub fn from_text(
        text: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            audio: Vec::new(),
            source_language: source_language.into(),
            target_language: target_language.into(),
            pre_transcribed_text: Some(text.into()),
            tts: TtsOptions::default(),
        }
    }

    /// Replace the synthesis options
    #[must_use]
    pub fn with_tts(mut self, tts: TtsOptions) -> Self {
        self.tts = tts;
        self
    }

    /// Attach pre-transcribed text to an audio request
    #[must_use]
    pub fn with_pre_transcribed_text(mut self, text: impl Into<String>) -> Self {
        self.pre_transcribed_text = Some(text.into());
        self
    }

    /// Whether speech-to-text can be skipped
    pub const fn has_pre_transcribed_text(&self) -> bool {
        self.pre_transcribed_text.is_some()
    }
}

/// Output of a completed pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    /// Text in the source language
    pub original_text: String,
    /// Text in the target language
    pub translated_text: String,
    /// Synthesized audio or browser marker, empty for silent mode
    pub audio: Vec<u8>,
    /// Strategy that produced `audio`
    pub tts_service_type: TtsServiceType,
    /// Wall-clock time of the whole run
    pub latency_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_use_browser() {
        let options = TtsOptions::default();
        assert_eq!(options.service_type, "browser");
        assert!(options.voice.is_none());
        assert!(!options.preserve_emotions);
    }

    #[test]
    fn builder_sets_fields() {
        let options = TtsOptions::new(TtsServiceType::Cloud)
            .with_voice("nova")
            .with_speed(1.25)
            .with_emotions(true);
        assert_eq!(options.parsed_service_type().unwrap(), TtsServiceType::Cloud);
        assert_eq!(options.voice.as_deref(), Some("nova"));
        assert_eq!(options.speed, Some(1.25));
        assert!(options.preserve_emotions);
    }

    #[test]
    fn unknown_service_type_is_rejected_on_parse() {
        let options = TtsOptions {
            service_type: "robot".to_string(),
            ..TtsOptions::default()
        };
        assert!(matches!(
            options.parsed_service_type(),
            Err(DomainError::UnknownTtsService(_))
        ));
    }

    #[test]
    fn speed_validation() {
        assert!(TtsOptions::default().validate_speed().is_ok());
        assert!(TtsOptions::default().with_speed(4.0).validate_speed().is_ok());
        assert!(TtsOptions::default().with_speed(0.1).validate_speed().is_err());
        assert!(TtsOptions::default().with_speed(5.0).validate_speed().is_err());
    }

    #[test]
    fn text_request_has_empty_audio() {
        let request = PipelineRequest::from_text("Bonjour", "fr", "en");
        assert!(request.audio.is_empty());
        assert!(request.has_pre_transcribed_text());
    }

    #[test]
    fn audio_request_keeps_bytes() {
        let request = PipelineRequest::from_audio(vec![1u8; 16], "fr", "en")
            .with_tts(TtsOptions::new(TtsServiceType::Silent));
        assert_eq!(request.audio.len(), 16);
        assert!(!request.has_pre_transcribed_text());
        assert_eq!(request.tts.service_type, "silent");
    }

    #[test]
    fn request_deserializes_from_camel_case() {
        let json = r#"{
            "sourceLanguage": "fr",
            "targetLanguage": "en",
            "preTranscribedText": "Bonjour",
            "tts": {"serviceType": "cloud", "preserveEmotions": true}
        }"#;
        let request: PipelineRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.pre_transcribed_text.as_deref(), Some("Bonjour"));
        assert_eq!(request.tts.service_type, "cloud");
        assert!(request.tts.preserve_emotions);
        assert!(request.audio.is_empty());
    }

    #[test]
    fn result_serializes_camel_case() {
        let result = PipelineResult {
            original_text: "Bonjour".to_string(),
            translated_text: "Hello".to_string(),
            audio: Vec::new(),
            tts_service_type: TtsServiceType::Silent,
            latency_ms: 12,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["translatedText"], "Hello");
        assert_eq!(json["ttsServiceType"], "silent");
        assert_eq!(json["latencyMs"], 12);
    }
}
