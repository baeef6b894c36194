//! Application services - Stage chains and the pipeline orchestrator

mod orchestrator;
mod stt_chain;
mod translation_chain;
pub mod tts;

pub use orchestrator::SpeechPipelineOrchestrator;
pub use stt_chain::{SttFallbackChain, SttInput};
pub use translation_chain::{TranslationFallbackChain, TranslationInput};
pub use tts::{
    BrowserStrategy, CloudStrategy, SilentStrategy, SynthesizedSpeech, TtsSelector, TtsStrategy,
};
