//! Text-to-speech strategy selection
//!
//! Each request names one of three strategies. `silent` produces nothing,
//! `browser` hands the text back as a marker for client-side synthesis and
//! `cloud` calls the synthesis provider through the audio cache.

mod cache_key;
mod emotion;
mod strategies;

use std::fmt;

use domain::{LanguageCode, Stage, TtsOptions, TtsServiceType};
use tracing::{debug, instrument};

pub use cache_key::{TtsCacheParams, tts_cache_key};
pub use emotion::{Emotion, VoiceProfile};
pub use strategies::{BrowserStrategy, CloudStrategy, SilentStrategy, TtsStrategy};

use crate::error::PipelineError;

/// Audio produced for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedSpeech {
    /// Payload; empty for silent delivery and blank text
    pub audio: Vec<u8>,
    /// Strategy that produced it
    pub service_type: TtsServiceType,
}

/// Routes synthesis requests to the strategy they name
pub struct TtsSelector {
    silent: SilentStrategy,
    browser: BrowserStrategy,
    cloud: CloudStrategy,
}

impl fmt::Debug for TtsSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtsSelector")
            .field("cloud", &self.cloud)
            .finish_non_exhaustive()
    }
}

impl TtsSelector {
    /// Create a selector around the cloud strategy
    #[must_use]
    pub const fn new(cloud: CloudStrategy) -> Self {
        Self {
            silent: SilentStrategy,
            browser: BrowserStrategy,
            cloud,
        }
    }

    /// Strategy registered for `service_type`
    #[must_use]
    pub fn strategy(&self, service_type: TtsServiceType) -> &dyn TtsStrategy {
        match service_type {
            TtsServiceType::Silent => &self.silent,
            TtsServiceType::Browser => &self.browser,
            TtsServiceType::Cloud => &self.cloud,
        }
    }

    /// Validate `options` and synthesize `text` with the selected strategy
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Validation` for an unknown service type or an
    /// out-of-range speed, and the strategy's error otherwise.
    #[instrument(skip(self, text, options), fields(language = %language, service = %options.service_type))]
    pub async fn synthesize(
        &self,
        text: &str,
        language: &LanguageCode,
        options: &TtsOptions,
    ) -> Result<SynthesizedSpeech, PipelineError> {
        let service_type = options.parsed_service_type().map_err(|e| {
            PipelineError::validation(Stage::Tts, "tts_service_type", e.to_string())
        })?;
        options
            .validate_speed()
            .map_err(|e| PipelineError::validation(Stage::Tts, "speed", e.to_string()))?;

        let audio = self
            .strategy(service_type)
            .synthesize(text, language, options)
            .await?;

        debug!(service = %service_type, size = audio.len(), "Speech synthesized");
        Ok(SynthesizedSpeech {
            audio,
            service_type,
        })
    }
}
