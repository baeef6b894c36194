//! Infrastructure layer - Configuration, logging and storage
//!
//! Loads `AppConfig`, installs the tracing subscriber, provides the TTS
//! audio caches behind the application's `AudioCachePort` and assembles the
//! speech pipeline from configuration.

pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod telemetry;

pub use bootstrap::{BootstrapError, Pipeline, build_pipeline};
pub use cache::{
    FileAudioCache, MokaAudioCache, MokaAudioCacheConfig, build_audio_cache, spawn_sweep_task,
};
pub use config::{AppConfig, CacheBackend, ResilienceAppConfig, TtsCacheConfig};
pub use telemetry::{TelemetryConfig, TelemetryError, init_telemetry};
