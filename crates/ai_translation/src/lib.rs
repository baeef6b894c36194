//! AI Translation - Text translation adapters
//!
//! Two vendors back the translation stage of the relay pipeline:
//! - `OpenAITranslator` - chat-completions prompt (paid, primary)
//! - `MyMemoryTranslator` - public MyMemory API (free, last resort)
//!
//! Both implement the `Translator` port. Ordering, breaker state and
//! same-language short-circuits live in the application layer.

pub mod config;
pub mod error;
pub mod ports;
pub mod providers;

pub use config::{MyMemoryConfig, TranslationConfig};
pub use error::TranslationError;
pub use ports::Translator;
pub use providers::{mymemory::MyMemoryTranslator, openai::OpenAITranslator};
