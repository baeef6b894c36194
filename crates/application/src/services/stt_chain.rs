//! Speech-to-text fallback chain
//!
//! Providers are tried in the order they are given (paid cloud vendors
//! first, the local whisper.cpp binary last). Before the final provider the
//! audio can be run through a voice isolation step; if isolation fails the
//! original buffer is used.

use std::{fmt, sync::Arc};

use ai_speech::{AudioData, AudioEnhancer, SpeechToText, Transcription};
use async_trait::async_trait;
use domain::{LanguageCode, Stage};
use resilience::{BreakerConfig, ErrorClassifier, Provider, ProviderChain, ProviderFailure};
use tracing::{debug, instrument, warn};

use crate::error::PipelineError;

/// Input handed to every STT provider
#[derive(Debug, Clone)]
pub struct SttInput {
    /// Audio to transcribe
    pub audio: AudioData,
    /// ISO 639-1 hint, if the speaker's language is known
    pub language: Option<String>,
}

/// Adapts a `SpeechToText` port to a chain provider
struct SttProvider {
    inner: Arc<dyn SpeechToText>,
}

#[async_trait]
impl Provider<SttInput, Transcription> for SttProvider {
    fn name(&self) -> &str {
        self.inner.provider_name()
    }

    fn is_configured(&self) -> bool {
        self.inner.is_configured()
    }

    async fn invoke(&self, input: &SttInput) -> Result<Transcription, ProviderFailure> {
        self.inner
            .transcribe(input.audio.clone(), input.language.as_deref())
            .await
            .map_err(ProviderFailure::from)
    }
}

/// Runs best-effort voice isolation before delegating to the wrapped provider
struct EnhancedSttProvider {
    inner: Arc<dyn SpeechToText>,
    enhancer: Arc<dyn AudioEnhancer>,
}

impl EnhancedSttProvider {
    async fn prepare(&self, audio: &AudioData) -> AudioData {
        if !self.enhancer.is_configured() {
            return audio.clone();
        }
        match self.enhancer.enhance(audio).await {
            Ok(clean) => {
                debug!(
                    enhancer = self.enhancer.provider_name(),
                    before = audio.size_bytes(),
                    after = clean.size_bytes(),
                    "Audio enhanced before final STT provider"
                );
                clean
            },
            Err(e) => {
                warn!(
                    enhancer = self.enhancer.provider_name(),
                    error = %e,
                    "Audio enhancement failed, using original audio"
                );
                audio.clone()
            },
        }
    }
}

#[async_trait]
impl Provider<SttInput, Transcription> for EnhancedSttProvider {
    fn name(&self) -> &str {
        self.inner.provider_name()
    }

    fn is_configured(&self) -> bool {
        self.inner.is_configured()
    }

    async fn invoke(&self, input: &SttInput) -> Result<Transcription, ProviderFailure> {
        let audio = self.prepare(&input.audio).await;
        self.inner
            .transcribe(audio, input.language.as_deref())
            .await
            .map_err(ProviderFailure::from)
    }
}

/// Ordered STT providers with per-provider breakers
pub struct SttFallbackChain {
    chain: ProviderChain<SttInput, Transcription>,
}

impl fmt::Debug for SttFallbackChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SttFallbackChain")
            .field("chain", &self.chain)
            .finish()
    }
}

impl SttFallbackChain {
    /// Build the chain
    ///
    /// `enhancer`, when given, only runs in front of the last provider.
    #[must_use]
    pub fn new(
        providers: Vec<Arc<dyn SpeechToText>>,
        enhancer: Option<Arc<dyn AudioEnhancer>>,
        breaker_config: BreakerConfig,
        classifier: Arc<ErrorClassifier>,
    ) -> Self {
        let mut chain = ProviderChain::new(Stage::Stt, breaker_config, classifier);
        let last = providers.len().saturating_sub(1);

        for (idx, inner) in providers.into_iter().enumerate() {
            let provider: Arc<dyn Provider<SttInput, Transcription>> =
                match (&enhancer, idx == last) {
                    (Some(enhancer), true) => Arc::new(EnhancedSttProvider {
                        inner,
                        enhancer: Arc::clone(enhancer),
                    }),
                    _ => Arc::new(SttProvider { inner }),
                };
            chain.push(provider);
        }

        Self { chain }
    }

    /// Underlying chain, for breaker inspection
    pub const fn chain(&self) -> &ProviderChain<SttInput, Transcription> {
        &self.chain
    }

    /// Transcribe one utterance
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Validation` for an empty buffer (no provider
    /// is called) and `PipelineError::Exhausted` if every provider failed.
    #[instrument(skip(self, audio), fields(audio_size = audio.size_bytes(), language = ?language.map(LanguageCode::as_str)))]
    pub async fn transcribe(
        &self,
        audio: AudioData,
        language: Option<&LanguageCode>,
    ) -> Result<String, PipelineError> {
        if audio.is_empty() {
            return Err(PipelineError::validation(
                Stage::Stt,
                "audio",
                "audio buffer is empty",
            ));
        }

        let input = SttInput {
            audio,
            language: language.map(|code| code.primary().to_string()),
        };
        let transcription = self.chain.attempt(&input).await?;

        Ok(transcription.text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use ai_speech::{AudioFormat, SpeechError};
    use mockall::mock;
    use resilience::ClassifierConfig;

    use super::*;

    type Script = Box<dyn Fn() -> Result<Transcription, SpeechError> + Send + Sync>;

    /// Records what it was asked to transcribe
    struct FakeStt {
        name: &'static str,
        configured: bool,
        script: Script,
        calls: Mutex<Vec<(AudioData, Option<String>)>>,
    }

    impl FakeStt {
        fn new(
            name: &'static str,
            script: impl Fn() -> Result<Transcription, SpeechError> + Send + Sync + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                name,
                configured: true,
                script: Box::new(script),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn unconfigured(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                configured: false,
                script: Box::new(|| Ok(Transcription::new("unreachable"))),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(AudioData, Option<String>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SpeechToText for FakeStt {
        async fn transcribe(
            &self,
            audio: AudioData,
            language: Option<&str>,
        ) -> Result<Transcription, SpeechError> {
            self.calls
                .lock()
                .unwrap()
                .push((audio, language.map(str::to_string)));
            (self.script)()
        }

        fn provider_name(&self) -> &str {
            self.name
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        fn model_name(&self) -> &str {
            "fake"
        }
    }

    mock! {
        pub Enhancer {}

        #[async_trait::async_trait]
        impl AudioEnhancer for Enhancer {
            async fn enhance(&self, audio: &AudioData) -> Result<AudioData, SpeechError>;
            fn provider_name(&self) -> &str;
            fn is_configured(&self) -> bool;
        }
    }

    fn classifier() -> Arc<ErrorClassifier> {
        Arc::new(ErrorClassifier::new(&ClassifierConfig::default()).unwrap())
    }

    fn webm(bytes: &[u8]) -> AudioData {
        AudioData::new(bytes.to_vec(), AudioFormat::Webm)
    }

    fn chain_of(
        providers: Vec<Arc<FakeStt>>,
        enhancer: Option<Arc<dyn AudioEnhancer>>,
    ) -> SttFallbackChain {
        let providers = providers
            .into_iter()
            .map(|p| p as Arc<dyn SpeechToText>)
            .collect();
        SttFallbackChain::new(providers, enhancer, BreakerConfig::default(), classifier())
    }

    #[tokio::test]
    async fn empty_audio_is_rejected_without_provider_calls() {
        let primary = FakeStt::new("openai-whisper", || Ok(Transcription::new("x")));
        let chain = chain_of(vec![Arc::clone(&primary)], None);

        let err = chain.transcribe(webm(&[]), None).await.unwrap_err();

        assert!(err.is_validation());
        assert_eq!(err.field(), Some("audio"));
        assert!(primary.calls().is_empty());
        assert!(chain.chain().snapshots().iter().all(|s| s.failure_count == 0));
    }

    #[tokio::test]
    async fn falls_back_and_trims_text() {
        let primary = FakeStt::new("openai-whisper", || Err(SpeechError::RateLimited));
        let secondary = FakeStt::new("deepgram", || Ok(Transcription::new("  Bonjour le monde ")));
        let chain = chain_of(vec![primary, secondary], None);

        let text = chain.transcribe(webm(&[1; 16]), None).await.unwrap();
        assert_eq!(text, "Bonjour le monde");

        let breaker = chain.chain().breaker("openai-whisper").unwrap();
        assert_eq!(breaker.snapshot().failure_count, 1);
    }

    #[tokio::test]
    async fn passes_primary_language_subtag() {
        let primary = FakeStt::new("openai-whisper", || Ok(Transcription::new("oui")));
        let chain = chain_of(vec![Arc::clone(&primary)], None);

        let language = LanguageCode::new("fr-CA").unwrap();
        let text = chain.transcribe(webm(&[1]), Some(&language)).await.unwrap();

        assert_eq!(text, "oui");
        assert_eq!(primary.calls()[0].1.as_deref(), Some("fr"));
    }

    #[tokio::test]
    async fn enhancer_runs_only_before_last_provider() {
        let primary = FakeStt::new("openai-whisper", || {
            Err(SpeechError::Api {
                status: 503,
                message: "overloaded".to_string(),
            })
        });
        let last = FakeStt::new("whisper-cpp", || Ok(Transcription::new("clean")));

        let mut enhancer = MockEnhancer::new();
        enhancer
            .expect_provider_name()
            .return_const("elevenlabs-isolation".to_string());
        enhancer.expect_is_configured().return_const(true);
        enhancer
            .expect_enhance()
            .times(1)
            .returning(|_| Ok(AudioData::new(vec![9, 9], AudioFormat::Mp3)));

        let chain = chain_of(
            vec![Arc::clone(&primary), Arc::clone(&last)],
            Some(Arc::new(enhancer)),
        );

        assert_eq!(chain.transcribe(webm(&[1, 2]), None).await.unwrap(), "clean");
        assert_eq!(primary.calls()[0].0.format(), AudioFormat::Webm);
        let (audio, _) = &last.calls()[0];
        assert_eq!(audio.format(), AudioFormat::Mp3);
        assert_eq!(audio.data(), [9, 9]);
    }

    #[tokio::test]
    async fn failed_enhancement_uses_original_audio() {
        let last = FakeStt::new("whisper-cpp", || Ok(Transcription::new("raw")));

        let mut enhancer = MockEnhancer::new();
        enhancer
            .expect_provider_name()
            .return_const("elevenlabs-isolation".to_string());
        enhancer.expect_is_configured().return_const(true);
        enhancer
            .expect_enhance()
            .returning(|_| Err(SpeechError::Timeout));

        let chain = chain_of(vec![Arc::clone(&last)], Some(Arc::new(enhancer)));

        assert_eq!(chain.transcribe(webm(&[1, 2]), None).await.unwrap(), "raw");
        let (audio, _) = &last.calls()[0];
        assert_eq!(audio.format(), AudioFormat::Webm);
        assert_eq!(audio.data(), [1, 2]);
    }

    #[tokio::test]
    async fn unconfigured_enhancer_is_skipped() {
        let last = FakeStt::new("whisper-cpp", || Ok(Transcription::new("raw")));

        let mut enhancer = MockEnhancer::new();
        enhancer.expect_is_configured().return_const(false);
        enhancer.expect_enhance().never();

        let chain = chain_of(vec![last], Some(Arc::new(enhancer)));
        assert_eq!(chain.transcribe(webm(&[1]), None).await.unwrap(), "raw");
    }

    #[tokio::test]
    async fn exhaustion_lists_every_provider() {
        let primary = FakeStt::new("openai-whisper", || Err(SpeechError::Timeout));
        let unconfigured = FakeStt::unconfigured("deepgram");
        let last = FakeStt::new("whisper-cpp", || {
            Err(SpeechError::NotAvailable("whisper.cpp not found".to_string()))
        });
        let chain = chain_of(vec![primary, Arc::clone(&unconfigured), last], None);

        let err = chain.transcribe(webm(&[1]), None).await.unwrap_err();

        assert!(unconfigured.calls().is_empty());
        match err {
            PipelineError::Exhausted { stage, attempts } => {
                assert_eq!(stage, Stage::Stt);
                let names: Vec<_> = attempts.iter().map(|a| a.provider.as_str()).collect();
                assert_eq!(names, ["openai-whisper", "deepgram", "whisper-cpp"]);
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
