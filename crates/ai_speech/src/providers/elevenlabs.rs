//! ElevenLabs Voice Isolation
//!
//! Strips background noise from classroom recordings with the
//! `/audio-isolation` endpoint. The response is MP3.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use tracing::{debug, instrument};

use super::error_from_response;
use crate::config::{ElevenLabsConfig, has_key};
use crate::error::SpeechError;
use crate::ports::AudioEnhancer;
use crate::types::{AudioData, AudioFormat};

/// ElevenLabs audio isolation client
#[derive(Debug, Clone)]
pub struct ElevenLabsVoiceIsolation {
    client: Client,
    config: ElevenLabsConfig,
    configured: bool,
}

impl ElevenLabsVoiceIsolation {
    /// Create a new voice isolation client
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the HTTP client cannot be built.
    pub fn new(config: ElevenLabsConfig, timeout_ms: u64) -> Result<Self, SpeechError> {
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
}

#[async_trait]
impl AudioEnhancer for ElevenLabsVoiceIsolation {
    #[instrument(skip(self, audio), fields(audio_size = audio.size_bytes()))]
    async fn enhance(&self, audio: &AudioData) -> Result<AudioData, SpeechError> {
        if !self.configured {
            return Err(SpeechError::NotAvailable(
                "ElevenLabs API key is not configured".to_string(),
            ));
        }

        let part = Part::bytes(audio.data().to_vec())
            .file_name(audio.filename("utterance"))
            .mime_str(audio.mime_type())
            .map_err(|e| SpeechError::InvalidAudio(format!("Invalid MIME type: {e}")))?;
        let form = Form::new().part("audio", part);

        let response = self
            .client
            .post(format!("{}/audio-isolation", self.config.base_url))
            .header(
                "xi-api-key",
                self.config.api_key.as_deref().unwrap_or_default(),
            )
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(SpeechError::InvalidResponse(
                "Voice isolation returned no audio".to_string(),
            ));
        }

        debug!(
            input_size = audio.size_bytes(),
            output_size = bytes.len(),
            "Voice isolation complete"
        );
        Ok(AudioData::new(bytes.to_vec(), AudioFormat::Mp3))
    }

    fn provider_name(&self) -> &str {
        "elevenlabs-isolation"
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}
