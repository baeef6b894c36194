//! Deepgram Speech-to-Text Provider
//!
//! Sends the raw audio body to Deepgram's pre-recorded `/listen` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header::CONTENT_TYPE};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::error_from_response;
use crate::config::{DeepgramConfig, has_key};
use crate::error::SpeechError;
use crate::ports::SpeechToText;
use crate::types::{AudioData, Transcription};

/// Deepgram STT provider
#[derive(Debug, Clone)]
pub struct DeepgramSttProvider {
    client: Client,
    config: DeepgramConfig,
    configured: bool,
}

impl DeepgramSttProvider {
    /// Create a new Deepgram provider
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the HTTP client cannot be built.
    pub fn new(config: DeepgramConfig, timeout_ms: u64) -> Result<Self, SpeechError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| {
                SpeechError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        let configured = has_key(config.api_key.as_deref());
        Ok(Self {
            client,
            config,
            configured,
        })
    }

    fn listen_url(&self) -> String {
        format!("{}/listen", self.config.base_url)
    }
}

#[derive(Debug, Deserialize)]
struct ListenResponse {
    results: ListenResults,
    #[serde(default)]
    metadata: Option<ListenMetadata>,
}

#[derive(Debug, Deserialize)]
struct ListenResults {
    channels: Vec<Channel>,
}

#[derive(Debug, Deserialize)]
struct Channel {
    alternatives: Vec<Alternative>,
    #[serde(default)]
    detected_language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    transcript: String,
    #[serde(default)]
    confidence: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ListenMetadata {
    #[serde(default)]
    duration: Option<f64>,
}

#[async_trait]
impl SpeechToText for DeepgramSttProvider {
    #[instrument(skip(self, audio), fields(audio_size = audio.size_bytes(), format = ?audio.format()))]
    async fn transcribe(
        &self,
        audio: AudioData,
        language: Option<&str>,
    ) -> Result<Transcription, SpeechError> {
        if !self.configured {
            return Err(SpeechError::NotAvailable(
                "Deepgram API key is not configured".to_string(),
            ));
        }
        if audio.is_empty() {
            return Err(SpeechError::InvalidAudio("Audio data is empty".to_string()));
        }

        let mut query = vec![
            ("model", self.config.model.clone()),
            ("smart_format", "true".to_string()),
        ];
        match language {
            Some(lang) => query.push(("language", lang.to_string())),
            None => query.push(("detect_language", "true".to_string())),
        }

        let response = self
            .client
            .post(self.listen_url())
            .header(
                "Authorization",
                format!("Token {}", self.config.api_key.as_deref().unwrap_or_default()),
            )
            .header(CONTENT_TYPE, audio.mime_type())
            .query(&query)
            .body(audio.into_data())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let listen: ListenResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        let channel = listen
            .results
            .channels
            .into_iter()
            .next()
            .ok_or_else(|| SpeechError::InvalidResponse("No channels in response".to_string()))?;
        let alternative = channel.alternatives.into_iter().next().ok_or_else(|| {
            SpeechError::InvalidResponse("No alternatives in response".to_string())
        })?;

        debug!(
            text_len = alternative.transcript.len(),
            confidence = ?alternative.confidence,
            "Transcription complete"
        );

        let mut transcription = Transcription::new(alternative.transcript.trim());
        if let Some(confidence) = alternative.confidence {
            transcription = transcription.with_confidence(confidence);
        }
        if let Some(lang) = channel
            .detected_language
            .or_else(|| language.map(str::to_string))
        {
            transcription = transcription.with_language(lang);
        }
        if let Some(duration) = listen.metadata.and_then(|m| m.duration) {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let duration_ms = (duration * 1000.0) as u64;
            transcription = transcription.with_duration(duration_ms);
        }

        Ok(transcription)
    }

    fn provider_name(&self) -> &str {
        "deepgram"
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
