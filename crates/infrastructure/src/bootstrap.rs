//! Pipeline assembly from configuration
//!
//! Provider order is fixed here:
//! - STT: OpenAI Whisper, Deepgram, local whisper.cpp (ElevenLabs voice
//!   isolation before the last one when enabled)
//! - Translation: OpenAI chat, MyMemory
//! - TTS: OpenAI speech behind the audio cache
//!
//! A file-backed cache also gets a background sweep task.

use std::sync::Arc;

use ai_speech::{
    AudioEnhancer, DeepgramSttProvider, ElevenLabsVoiceIsolation, OpenAISpeechProvider,
    SpeechError, SpeechToText, TextToSpeech, WhisperCppProvider,
};
use ai_translation::{MyMemoryTranslator, OpenAITranslator, TranslationError, Translator};
use application::{
    CloudStrategy, SpeechPipelineOrchestrator, SttFallbackChain, TranslationFallbackChain,
    TtsSelector,
    ports::{AudioCachePort, CacheError},
};
use resilience::ErrorClassifier;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::info;

use crate::{
    cache::{build_audio_cache, spawn_sweep_task},
    config::{AppConfig, CacheBackend},
};

/// Errors while wiring the pipeline
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// A speech adapter could not be created
    #[error("speech provider: {0}")]
    Speech(#[from] SpeechError),

    /// A translation adapter could not be created
    #[error("translation provider: {0}")]
    Translation(#[from] TranslationError),

    /// The classifier keyword automaton could not be built
    #[error("error classifier: {0}")]
    Classifier(String),

    /// The audio cache could not be opened
    #[error("audio cache: {0}")]
    Cache(#[from] CacheError),
}

/// A ready-to-use pipeline
pub struct Pipeline {
    /// Orchestrator for single utterances
    pub orchestrator: SpeechPipelineOrchestrator,
    /// Audio cache shared with the cloud TTS strategy, for sweeping
    pub cache: Option<Arc<dyn AudioCachePort>>,
    /// Periodic sweep of the file cache, abort on shutdown
    pub sweep_task: Option<JoinHandle<()>>,
}

impl Pipeline {
    /// Stop background tasks
    pub fn shutdown(&mut self) {
        if let Some(task) = self.sweep_task.take() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("orchestrator", &self.orchestrator)
            .field("cached", &self.cache.is_some())
            .field("sweeping", &self.sweep_task.is_some())
            .finish()
    }
}

/// Build the orchestrator and its providers from `config`
pub async fn build_pipeline(config: &AppConfig) -> Result<Pipeline, BootstrapError> {
    let classifier = Arc::new(
        ErrorClassifier::new(&config.resilience.classifier)
            .map_err(|e| BootstrapError::Classifier(e.to_string()))?,
    );
    let speech = &config.speech;

    let openai = Arc::new(OpenAISpeechProvider::new(speech.clone())?);
    let stt_providers: Vec<Arc<dyn SpeechToText>> = vec![
        openai.clone(),
        Arc::new(DeepgramSttProvider::new(
            speech.deepgram.clone(),
            speech.timeout_ms,
        )?),
        Arc::new(WhisperCppProvider::new(speech.whisper_cpp.clone())),
    ];
    let enhancer: Option<Arc<dyn AudioEnhancer>> = if speech.elevenlabs.enhance_before_fallback {
        Some(Arc::new(ElevenLabsVoiceIsolation::new(
            speech.elevenlabs.clone(),
            speech.timeout_ms,
        )?))
    } else {
        None
    };

    let translators: Vec<Arc<dyn Translator>> = vec![
        Arc::new(OpenAITranslator::new(config.translation.clone())?),
        Arc::new(MyMemoryTranslator::new(&config.translation)?),
    ];

    let cache = build_audio_cache(&config.tts_cache).await?;
    let mut cloud = CloudStrategy::new(openai as Arc<dyn TextToSpeech>, classifier.clone())
        .with_default_speed(speech.speed);
    if let Some(cache) = &cache {
        cloud = cloud.with_cache(cache.clone());
    }

    let stt = SttFallbackChain::new(
        stt_providers,
        enhancer,
        config.resilience.stt,
        classifier.clone(),
    );
    let translation =
        TranslationFallbackChain::new(translators, config.resilience.translation, classifier);

    info!(
        stt = ?stt.chain().provider_names(),
        translation = ?translation.chain().provider_names(),
        cache = %config.tts_cache.backend,
        "Pipeline assembled"
    );

    let orchestrator = SpeechPipelineOrchestrator::new(stt, translation, TtsSelector::new(cloud))
        .with_input_format(speech.input_format);

    // Moka evicts expired entries itself
    let sweep_task = match (&cache, config.tts_cache.backend) {
        (Some(cache), CacheBackend::File) => Some(spawn_sweep_task(
            cache.clone(),
            config.tts_cache.sweep_interval(),
        )),
        _ => None,
    };

    Ok(Pipeline {
        orchestrator,
        cache,
        sweep_task,
    })
}
