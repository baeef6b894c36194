//! TTS audio caches
//!
//! Two backends implement the application's `AudioCachePort`:
//! - [`FileAudioCache`]: `<key>.audio` files, survives restarts
//! - [`MokaAudioCache`]: in-process, bounded by bytes
//!
//! Keys are computed by the application (blake3 hex of the synthesis
//! parameters); the caches treat them as opaque hex strings.

mod file_cache;
mod moka_cache;
mod sweep;

use std::sync::Arc;

use application::ports::{AudioCachePort, CacheError};

pub use file_cache::FileAudioCache;
pub use moka_cache::{MokaAudioCache, MokaAudioCacheConfig};
pub use sweep::spawn_sweep_task;

use crate::config::{CacheBackend, TtsCacheConfig};

/// Build the cache selected by `config`, or `None` when caching is disabled
pub async fn build_audio_cache(
    config: &TtsCacheConfig,
) -> Result<Option<Arc<dyn AudioCachePort>>, CacheError> {
    let cache: Arc<dyn AudioCachePort> = match config.backend {
        CacheBackend::File => {
            Arc::new(FileAudioCache::open(config.resolved_dir(), config.ttl()).await?)
        },
        CacheBackend::Memory => Arc::new(MokaAudioCache::with_config(MokaAudioCacheConfig {
            max_capacity_mb: config.max_capacity_mb,
            ttl: config.ttl(),
        })),
        CacheBackend::Disabled => return Ok(None),
    };
    Ok(Some(cache))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_backend_builds_nothing() {
        let config = TtsCacheConfig {
            backend: CacheBackend::Disabled,
            ..Default::default()
        };
        assert!(build_audio_cache(&config).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_backend_uses_configured_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let config = TtsCacheConfig {
            dir: Some(tmp.path().join("tts")),
            ..Default::default()
        };

        let cache = build_audio_cache(&config).await.unwrap().unwrap();
        cache.put("ab12", &[5]).await.unwrap();

        assert!(tmp.path().join("tts").join("ab12.audio").is_file());
    }

    #[tokio::test]
    async fn memory_backend_round_trips() {
        let config = TtsCacheConfig {
            backend: CacheBackend::Memory,
            ..Default::default()
        };

        let cache = build_audio_cache(&config).await.unwrap().unwrap();
        cache.put("ab12", &[5]).await.unwrap();

        assert_eq!(cache.get("ab12").await.unwrap(), Some(vec![5]));
    }
}
