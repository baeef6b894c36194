//! AI Speech - Speech-to-text, text-to-speech and voice isolation
//!
//! Provides traits and vendor implementations for the speech stages of the
//! relay pipeline:
//! - `SpeechToText` - Transcribe audio to text (STT)
//! - `TextToSpeech` - Synthesize speech from text (TTS)
//! - `AudioEnhancer` - Clean up audio before a last-resort transcription
//!
//! # Architecture
//!
//! This crate follows the ports & adapters pattern:
//! - `ports` module defines the traits (ports)
//! - `providers` module contains concrete implementations (adapters)
//!
//! # Supported Providers
//!
//! - OpenAI Whisper (STT) and TTS API
//! - Deepgram pre-recorded transcription (STT)
//! - Local whisper.cpp CLI (STT)
//! - ElevenLabs audio isolation (enhancement)
//!
//! # Example
//!
//! ```ignore
//! use ai_speech::{AudioData, AudioFormat, OpenAISpeechProvider, SpeechToText};
//!
//! let provider = OpenAISpeechProvider::new(config)?;
//! let audio = AudioData::new(bytes, AudioFormat::Webm);
//! let transcription = provider.transcribe(audio, Some("fr")).await?;
//! println!("Transcribed: {}", transcription.text);
//! ```

pub mod config;
pub mod error;
pub mod ports;
pub mod providers;
pub mod types;

pub use config::{DeepgramConfig, ElevenLabsConfig, SpeechConfig, WhisperCppConfig};
pub use error::SpeechError;
pub use ports::{AudioEnhancer, SpeechToText, TextToSpeech};
pub use providers::{
    deepgram::DeepgramSttProvider, elevenlabs::ElevenLabsVoiceIsolation,
    openai::OpenAISpeechProvider, whisper_cpp::WhisperCppProvider,
};
pub use types::{AudioData, AudioFormat, SynthesisRequest, Transcription};
