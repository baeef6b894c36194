//! Port definitions for the application layer
//!
//! Speech, translation and synthesis vendors are reached through the ports
//! of the `ai_speech` and `ai_translation` crates. The ports here cover
//! what the application needs from infrastructure.

mod audio_cache_port;

pub use audio_cache_port::{AudioCachePort, CacheError};

#[cfg(test)]
pub use audio_cache_port::MockAudioCachePort;
