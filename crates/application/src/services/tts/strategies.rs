//! Speech synthesis strategies

use std::sync::Arc;

use ai_speech::{SynthesisRequest, TextToSpeech};
use async_trait::async_trait;
use domain::{LanguageCode, SPEED_RANGE, Stage, TtsOptions, TtsServiceType};
use resilience::{ErrorClassifier, ProviderFailure};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::cache_key::{TtsCacheParams, tts_cache_key};
use super::emotion::Emotion;
use crate::error::PipelineError;
use crate::ports::AudioCachePort;

/// One way of turning translated text into something a listener can play
#[async_trait]
pub trait TtsStrategy: Send + Sync {
    /// Strategy identifier
    fn service_type(&self) -> TtsServiceType;

    /// Produce the payload for `text`
    ///
    /// # Errors
    ///
    /// Returns `PipelineError` if the payload cannot be produced.
    async fn synthesize(
        &self,
        text: &str,
        language: &LanguageCode,
        options: &TtsOptions,
    ) -> Result<Vec<u8>, PipelineError>;
}

/// Text-only delivery, no audio
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentStrategy;

#[async_trait]
impl TtsStrategy for SilentStrategy {
    fn service_type(&self) -> TtsServiceType {
        TtsServiceType::Silent
    }

    async fn synthesize(
        &self,
        _text: &str,
        _language: &LanguageCode,
        _options: &TtsOptions,
    ) -> Result<Vec<u8>, PipelineError> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrowserTtsMarker<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
    language_code: &'a str,
    speed: f32,
    preserve_emotions: bool,
}

/// Delegates synthesis to the listener's browser
///
/// The payload is a small JSON marker the client hands to its local speech
/// engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStrategy;

#[async_trait]
impl TtsStrategy for BrowserStrategy {
    fn service_type(&self) -> TtsServiceType {
        TtsServiceType::Browser
    }

    async fn synthesize(
        &self,
        text: &str,
        language: &LanguageCode,
        options: &TtsOptions,
    ) -> Result<Vec<u8>, PipelineError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let marker = BrowserTtsMarker {
            kind: "browser-tts",
            text,
            language_code: language.as_str(),
            speed: options.speed.unwrap_or(1.0),
            preserve_emotions: options.preserve_emotions,
        };
        serde_json::to_vec(&marker)
            .map_err(|e| PipelineError::validation(Stage::Tts, "text", e.to_string()))
    }
}

/// Provider name used when classifying cloud synthesis failures
const CLOUD_PROVIDER: &str = "openai-tts";

/// Cloud synthesis with a content-addressed audio cache
pub struct CloudStrategy {
    tts: Arc<dyn TextToSpeech>,
    cache: Option<Arc<dyn AudioCachePort>>,
    classifier: Arc<ErrorClassifier>,
    default_speed: f32,
}

impl std::fmt::Debug for CloudStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudStrategy")
            .field("cached", &self.cache.is_some())
            .field("default_speed", &self.default_speed)
            .finish_non_exhaustive()
    }
}

/// Parameters after applying caller options and the emotion profile
#[derive(Debug, Clone, PartialEq)]
struct ResolvedSynthesis {
    text: String,
    voice: String,
    speed: f32,
}

impl CloudStrategy {
    /// Create a cloud strategy
    #[must_use]
    pub fn new(tts: Arc<dyn TextToSpeech>, classifier: Arc<ErrorClassifier>) -> Self {
        Self {
            tts,
            cache: None,
            classifier,
            default_speed: 1.0,
        }
    }

    /// Attach an audio cache
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn AudioCachePort>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Speed used when the request does not set one
    #[must_use]
    pub const fn with_default_speed(mut self, speed: f32) -> Self {
        self.default_speed = speed;
        self
    }

    fn resolve(&self, text: &str, options: &TtsOptions) -> ResolvedSynthesis {
        let requested_speed = options.speed.unwrap_or(self.default_speed);
        let explicit_voice = options
            .voice
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty());

        if !options.preserve_emotions {
            return ResolvedSynthesis {
                text: text.to_string(),
                voice: explicit_voice
                    .unwrap_or_else(|| self.tts.default_voice())
                    .to_string(),
                speed: requested_speed,
            };
        }

        let emotion = Emotion::detect(text);
        let profile = emotion.profile();
        debug!(emotion = emotion.as_str(), "Emotion detected");

        ResolvedSynthesis {
            text: emotion.format_text(text),
            voice: explicit_voice
                .or(profile.voice)
                .unwrap_or_else(|| self.tts.default_voice())
                .to_string(),
            speed: (requested_speed * profile.speed_factor)
                .clamp(*SPEED_RANGE.start(), *SPEED_RANGE.end()),
        }
    }

    async fn cached(&self, key: &str) -> Option<Vec<u8>> {
        let cache = self.cache.as_ref()?;
        match cache.get(key).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(error = %e, "TTS cache read failed, synthesizing");
                None
            },
        }
    }

    async fn store(&self, key: &str, audio: &[u8]) {
        if let Some(cache) = &self.cache
            && let Err(e) = cache.put(key, audio).await
        {
            warn!(error = %e, "TTS cache write failed");
        }
    }
}

#[async_trait]
impl TtsStrategy for CloudStrategy {
    fn service_type(&self) -> TtsServiceType {
        TtsServiceType::Cloud
    }

    #[instrument(skip(self, text, options), fields(language = %language, text_len = text.len()))]
    async fn synthesize(
        &self,
        text: &str,
        language: &LanguageCode,
        options: &TtsOptions,
    ) -> Result<Vec<u8>, PipelineError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let resolved = self.resolve(text, options);
        let key = tts_cache_key(&TtsCacheParams {
            text,
            language: language.as_str(),
            voice: &resolved.voice,
            speed: resolved.speed,
            preserve_emotions: options.preserve_emotions,
        });

        if let Some(audio) = self.cached(&key).await {
            debug!(key = %key, size = audio.len(), "TTS cache hit");
            return Ok(audio);
        }

        let request = SynthesisRequest::new(resolved.text)
            .with_voice(resolved.voice)
            .with_speed(resolved.speed);

        let audio = self
            .tts
            .synthesize(&request)
            .await
            .map_err(|e| PipelineError::Provider {
                stage: Stage::Tts,
                error: self.classifier.classify_failure(
                    Stage::Tts,
                    CLOUD_PROVIDER,
                    ProviderFailure::from(e),
                ),
            })?
            .into_data();

        self.store(&key, &audio).await;
        debug!(key = %key, size = audio.len(), "TTS synthesized");
        Ok(audio)
    }
}
