//! Value Objects - Immutable, identity-less domain primitives

mod language_code;
mod stage;
mod tts_service;

pub use language_code::LanguageCode;
pub use stage::{PipelineState, Stage};
pub use tts_service::TtsServiceType;
