//! Speech pipeline orchestrator
//!
//! Runs one utterance through transcription, translation and synthesis.
//! Each stage either succeeds or ends the run in `Failed(stage)`; there is
//! no retry across stages.

use ai_speech::{AudioData, AudioFormat};
use domain::{LanguageCode, PipelineRequest, PipelineResult, PipelineState, Stage, TtsOptions};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::{SttFallbackChain, TranslationFallbackChain, TtsSelector};
use crate::error::PipelineError;

/// Sequences STT, translation and TTS for a single utterance
#[derive(Debug)]
pub struct SpeechPipelineOrchestrator {
    stt: SttFallbackChain,
    translation: TranslationFallbackChain,
    tts: TtsSelector,
    input_format: AudioFormat,
}

impl SpeechPipelineOrchestrator {
    /// Create an orchestrator; raw audio is assumed to be WebM
    #[must_use]
    pub const fn new(
        stt: SttFallbackChain,
        translation: TranslationFallbackChain,
        tts: TtsSelector,
    ) -> Self {
        Self {
            stt,
            translation,
            tts,
            input_format: AudioFormat::Webm,
        }
    }

    /// Container format of incoming audio buffers
    #[must_use]
    pub const fn with_input_format(mut self, format: AudioFormat) -> Self {
        self.input_format = format;
        self
    }

    /// STT chain
    pub const fn stt(&self) -> &SttFallbackChain {
        &self.stt
    }

    /// Translation chain
    pub const fn translation(&self) -> &TranslationFallbackChain {
        &self.translation
    }

    /// TTS selector
    pub const fn tts(&self) -> &TtsSelector {
        &self.tts
    }

    /// Process a request
    ///
    /// # Errors
    ///
    /// See [`Self::process_parts`].
    pub async fn process(&self, request: PipelineRequest) -> Result<PipelineResult, PipelineError> {
        let PipelineRequest {
            audio,
            source_language,
            target_language,
            pre_transcribed_text,
            tts,
        } = request;

        self.process_parts(
            audio,
            &source_language,
            &target_language,
            pre_transcribed_text.as_deref(),
            &tts,
        )
        .await
    }

    /// Process one utterance given as loose parts
    ///
    /// When `pre_text` is present transcription is skipped and `audio` is
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError` carrying the stage that failed. Its
    /// `failed_state()` is the terminal state of the run.
    #[instrument(
        skip(self, audio, pre_text, options),
        fields(
            audio_bytes = audio.len(),
            source = %source,
            target = %target,
            pre_transcribed = pre_text.is_some(),
            tts = %options.service_type,
        )
    )]
    pub async fn process_parts(
        &self,
        audio: Vec<u8>,
        source: &str,
        target: &str,
        pre_text: Option<&str>,
        options: &TtsOptions,
    ) -> Result<PipelineResult, PipelineError> {
        let started = Instant::now();
        let mut state = PipelineState::Idle;

        let source_stage = if pre_text.is_some() {
            Stage::Translation
        } else {
            Stage::Stt
        };
        let source = parse_language(source, source_stage, "source_language")
            .map_err(|e| fail(state, e))?;
        let target = parse_language(target, Stage::Translation, "target_language")
            .map_err(|e| fail(state, e))?;

        let original_text = if let Some(text) = pre_text {
            text.trim().to_string()
        } else {
            advance(&mut state, PipelineState::Transcribing);
            let audio = AudioData::new(audio, self.input_format);
            self.stt
                .transcribe(audio, Some(&source))
                .await
                .map_err(|e| fail(state, e))?
        };

        advance(&mut state, PipelineState::Translating);
        let translated_text = if original_text.is_empty() {
            debug!("Nothing to translate");
            String::new()
        } else {
            self.translation
                .translate(&original_text, &source, &target)
                .await
                .map_err(|e| fail(state, e))?
        };

        advance(&mut state, PipelineState::Synthesizing);
        let speech = self
            .tts
            .synthesize(&translated_text, &target, options)
            .await
            .map_err(|e| fail(state, e))?;

        advance(&mut state, PipelineState::Done);
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            latency_ms,
            original_len = original_text.len(),
            translated_len = translated_text.len(),
            audio_bytes = speech.audio.len(),
            "Pipeline completed"
        );

        Ok(PipelineResult {
            original_text,
            translated_text,
            audio: speech.audio,
            tts_service_type: speech.service_type,
            latency_ms,
        })
    }
}

fn parse_language(raw: &str, stage: Stage, field: &str) -> Result<LanguageCode, PipelineError> {
    LanguageCode::new(raw).map_err(|e| PipelineError::validation(stage, field, e.to_string()))
}

fn advance(state: &mut PipelineState, next: PipelineState) {
    debug_assert!(
        state.can_transition_to(next),
        "illegal pipeline transition {state} -> {next}"
    );
    debug!(from = %state, to = %next, "Pipeline state transition");
    *state = next;
}

fn fail(state: PipelineState, error: PipelineError) -> PipelineError {
    let next = error.failed_state();
    if error.is_validation() {
        debug!(from = %state, to = %next, error = %error, "Pipeline rejected input");
    } else {
        warn!(from = %state, to = %next, error = %error, "Pipeline failed");
    }
    error
}
