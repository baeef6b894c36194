//! Domain layer for the classroom speech relay
//!
//! Contains the value types shared by every pipeline stage: stages, language
//! codes, TTS strategy selection and the per-utterance request/result pair.
//! This layer has no I/O and defines the ubiquitous language.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
