//! Translation fallback chain

use std::{fmt, sync::Arc};

use ai_translation::Translator;
use async_trait::async_trait;
use domain::{LanguageCode, Stage};
use resilience::{BreakerConfig, ErrorClassifier, Provider, ProviderChain, ProviderFailure};
use tracing::{debug, instrument};

use crate::error::PipelineError;

/// Input handed to every translation provider
#[derive(Debug, Clone)]
pub struct TranslationInput {
    /// Text to translate
    pub text: String,
    /// Source language
    pub source: LanguageCode,
    /// Target language
    pub target: LanguageCode,
}

struct TranslatorProvider {
    inner: Arc<dyn Translator>,
}

#[async_trait]
impl Provider<TranslationInput, String> for TranslatorProvider {
    fn name(&self) -> &str {
        self.inner.provider_name()
    }

    fn is_configured(&self) -> bool {
        self.inner.is_configured()
    }

    async fn invoke(&self, input: &TranslationInput) -> Result<String, ProviderFailure> {
        self.inner
            .translate(&input.text, input.source.as_str(), input.target.as_str())
            .await
            .map_err(ProviderFailure::from)
    }
}

/// Ordered translators with per-provider breakers
pub struct TranslationFallbackChain {
    chain: ProviderChain<TranslationInput, String>,
}

impl fmt::Debug for TranslationFallbackChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationFallbackChain")
            .field("chain", &self.chain)
            .finish()
    }
}

impl TranslationFallbackChain {
    /// Build the chain from translators in priority order
    #[must_use]
    pub fn new(
        translators: Vec<Arc<dyn Translator>>,
        breaker_config: BreakerConfig,
        classifier: Arc<ErrorClassifier>,
    ) -> Self {
        let mut chain = ProviderChain::new(Stage::Translation, breaker_config, classifier);
        for inner in translators {
            chain.push(Arc::new(TranslatorProvider { inner }));
        }
        Self { chain }
    }

    /// Underlying chain, for breaker inspection
    pub const fn chain(&self) -> &ProviderChain<TranslationInput, String> {
        &self.chain
    }

    /// Translate `text` from `source` to `target`
    ///
    /// Same-language pairs return the input unchanged and blank input
    /// returns an empty string; neither calls a provider.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Exhausted` if every translator failed.
    #[instrument(skip(self, text), fields(source = %source, target = %target, text_len = text.len()))]
    pub async fn translate(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> Result<String, PipelineError> {
        if source == target {
            debug!("Source and target are the same language, skipping translation");
            return Ok(text.to_string());
        }

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(String::new());
        }

        let input = TranslationInput {
            text: trimmed.to_string(),
            source: source.clone(),
            target: target.clone(),
        };
        let translated = self.chain.attempt(&input).await?;

        Ok(translated.trim().to_string())
    }
}
