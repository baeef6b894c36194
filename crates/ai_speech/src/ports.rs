//! Port definitions for speech processing
//!
//! Defines the traits (ports) that speech processing adapters must implement.

use async_trait::async_trait;

use crate::error::SpeechError;
use crate::types::{AudioData, SynthesisRequest, Transcription};

/// Port for Speech-to-Text (STT) implementations
///
/// # Example
///
/// ```ignore
/// use ai_speech::{SpeechToText, AudioData, AudioFormat};
///
/// async fn transcribe_utterance(
///     stt: &impl SpeechToText,
///     audio: AudioData,
/// ) -> Result<String, SpeechError> {
///     let transcription = stt.transcribe(audio, Some("fr")).await?;
///     Ok(transcription.text)
/// }
/// ```
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe audio to text
    ///
    /// # Arguments
    ///
    /// * `audio` - Audio data to transcribe
    /// * `language` - Optional ISO 639-1 language hint (e.g., "en", "fr")
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if transcription fails.
    async fn transcribe(
        &self,
        audio: AudioData,
        language: Option<&str>,
    ) -> Result<Transcription, SpeechError>;

    /// Stable provider name
    fn provider_name(&self) -> &str;

    /// Whether credentials/binaries needed for a call are present
    fn is_configured(&self) -> bool;

    /// Get the name of the STT model
    fn model_name(&self) -> &str;
}

/// Port for Text-to-Speech (TTS) implementations
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Convert text to speech
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if synthesis fails.
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioData, SpeechError>;

    /// Whether credentials needed for a call are present
    fn is_configured(&self) -> bool;

    /// Voice used when the request does not name one
    fn default_voice(&self) -> &str;
}

/// Port for audio clean-up before transcription
#[async_trait]
pub trait AudioEnhancer: Send + Sync {
    /// Return a cleaner version of the audio
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if enhancement fails; callers fall back to the
    /// original audio.
    async fn enhance(&self, audio: &AudioData) -> Result<AudioData, SpeechError>;

    /// Stable provider name
    fn provider_name(&self) -> &str;

    /// Whether credentials needed for a call are present
    fn is_configured(&self) -> bool;
}
