//! Application layer - Resilient speech pipeline
//!
//! Wires vendor ports into per-stage fallback chains and sequences them for
//! one utterance: speech-to-text, translation, then speech synthesis.
//! Infrastructure supplies the concrete providers and the audio cache.

pub mod error;
pub mod ports;
pub mod services;

pub use error::PipelineError;
pub use ports::*;
pub use services::*;
