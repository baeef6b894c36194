//! OpenAI Speech Provider
//!
//! Implements `SpeechToText` using OpenAI Whisper and `TextToSpeech` using OpenAI TTS.
//!
//! # Supported Audio Formats
//!
//! ## STT (Whisper)
//! - mp3, mp4, mpeg, mpga, m4a, wav, webm, ogg
//!
//! ## TTS
//! - mp3, opus, aac, flac, wav, pcm

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::error_from_response;
use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::ports::{SpeechToText, TextToSpeech};
use crate::types::{AudioData, SynthesisRequest, Transcription};

/// OpenAI TTS input limit in characters
const MAX_TTS_CHARS: usize = 4096;

/// OpenAI speech provider implementing both STT and TTS
#[derive(Debug, Clone)]
pub struct OpenAISpeechProvider {
    client: Client,
    config: SpeechConfig,
    configured: bool,
}

impl OpenAISpeechProvider {
    /// Create a new OpenAI speech provider
    ///
    /// A missing API key is allowed; the provider then reports itself as
    /// not configured.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the configuration is invalid.
    pub fn new(config: SpeechConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                SpeechError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        let configured = config.has_openai_key();
        Ok(Self {
            client,
            config,
            configured,
        })
    }

    /// Get the API key
    fn api_key(&self) -> &str {
        self.config.openai_api_key.as_deref().unwrap_or_default()
    }

    /// Build the STT endpoint URL
    fn stt_url(&self) -> String {
        format!("{}/audio/transcriptions", self.config.openai_base_url)
    }

    /// Build the TTS endpoint URL
    fn tts_url(&self) -> String {
        format!("{}/audio/speech", self.config.openai_base_url)
    }

    fn ensure_configured(&self) -> Result<(), SpeechError> {
        if self.configured {
            Ok(())
        } else {
            Err(SpeechError::NotAvailable(
                "OpenAI API key is not configured".to_string(),
            ))
        }
    }
}

/// OpenAI Whisper transcription response
#[derive(Debug, Deserialize)]
struct WhisperResponse {
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
}

/// OpenAI TTS request body
#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    speed: Option<f32>,
}

#[async_trait]
impl SpeechToText for OpenAISpeechProvider {
    #[instrument(skip(self, audio), fields(audio_size = audio.size_bytes(), format = ?audio.format()))]
    async fn transcribe(
        &self,
        audio: AudioData,
        language: Option<&str>,
    ) -> Result<Transcription, SpeechError> {
        debug!("Transcribing audio with OpenAI Whisper");
        self.ensure_configured()?;

        if let Some(duration_ms) = audio.duration_ms() {
            if duration_ms > self.config.max_audio_duration_ms {
                return Err(SpeechError::AudioTooLong {
                    duration_ms,
                    max_ms: self.config.max_audio_duration_ms,
                });
            }
        }

        if audio.is_empty() {
            return Err(SpeechError::InvalidAudio("Audio data is empty".to_string()));
        }

        if !audio.format().is_whisper_supported() {
            return Err(SpeechError::InvalidAudio(format!(
                "Audio format {:?} is not supported by Whisper",
                audio.format()
            )));
        }

        let filename = audio.filename("audio");
        let mime_type = audio.mime_type();
        let data = audio.into_data();

        let file_part = Part::bytes(data)
            .file_name(filename)
            .mime_str(mime_type)
            .map_err(|e| SpeechError::InvalidAudio(format!("Invalid MIME type: {e}")))?;

        let mut form = Form::new()
            .part("file", file_part)
            .text("model", self.config.stt_model.clone())
            .text("response_format", "verbose_json");
        if let Some(lang) = language {
            form = form.text("language", lang.to_string());
        }

        let response = self
            .client
            .post(self.stt_url())
            .bearer_auth(self.api_key())
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let whisper_response: WhisperResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        debug!(
            text_len = whisper_response.text.len(),
            language = ?whisper_response.language,
            "Transcription complete"
        );

        let mut transcription = Transcription::new(whisper_response.text.trim());

        if let Some(lang) = whisper_response.language.or_else(|| language.map(str::to_string)) {
            transcription = transcription.with_language(lang);
        }

        if let Some(duration) = whisper_response.duration {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let duration_ms = (duration * 1000.0) as u64;
            transcription = transcription.with_duration(duration_ms);
        }

        Ok(transcription)
    }

    fn provider_name(&self) -> &str {
        "openai-whisper"
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    fn model_name(&self) -> &str {
        &self.config.stt_model
    }
}

#[async_trait]
impl TextToSpeech for OpenAISpeechProvider {
    #[instrument(skip(self, request), fields(text_len = request.text.len(), voice = ?request.voice))]
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioData, SpeechError> {
        debug!("Synthesizing speech with OpenAI TTS");
        self.ensure_configured()?;

        if request.text.trim().is_empty() {
            return Err(SpeechError::SynthesisFailed(
                "Text cannot be empty".to_string(),
            ));
        }

        let char_count = request.text.chars().count();
        if char_count > MAX_TTS_CHARS {
            return Err(SpeechError::SynthesisFailed(format!(
                "Text too long: {char_count} characters exceeds {MAX_TTS_CHARS} limit"
            )));
        }

        let voice = request
            .voice
            .as_deref()
            .unwrap_or(&self.config.default_voice);
        let format = request.format.unwrap_or(self.config.output_format);
        let speed = request.speed.unwrap_or(self.config.speed);

        let body = TtsRequest {
            model: &self.config.tts_model,
            input: &request.text,
            voice,
            response_format: format.openai_response_format(),
            speed: if (speed - 1.0).abs() < f32::EPSILON {
                None
            } else {
                Some(speed)
            },
        };

        let response = self
            .client
            .post(self.tts_url())
            .bearer_auth(self.api_key())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(SpeechError::InvalidResponse(
                "TTS returned no audio".to_string(),
            ));
        }

        debug!(audio_size = bytes.len(), "Synthesis complete");
        Ok(AudioData::new(bytes.to_vec(), format))
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    fn default_voice(&self) -> &str {
        &self.config.default_voice
    }
}
