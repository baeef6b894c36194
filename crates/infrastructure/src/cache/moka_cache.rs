//! Moka in-memory TTS audio cache
//!
//! Thread-safe in-process cache with TTL and a byte-weighted capacity.
//! Entries do not survive a restart.

use std::time::Duration;

use application::ports::{AudioCachePort, CacheError};
use async_trait::async_trait;
use moka::future::Cache;
use tracing::{debug, instrument};

/// Configuration for the Moka cache
#[derive(Debug, Clone, Copy)]
pub struct MokaAudioCacheConfig {
    /// Maximum capacity in megabytes
    pub max_capacity_mb: u64,
    /// Entry lifetime
    pub ttl: Duration,
}

impl Default for MokaAudioCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity_mb: 64,
            ttl: Duration::from_secs(24 * 60 * 60), // 24 hours
        }
    }
}

/// Moka-based audio cache
pub struct MokaAudioCache {
    cache: Cache<String, Vec<u8>>,
}

impl std::fmt::Debug for MokaAudioCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaAudioCache")
            .field("entries", &self.cache.entry_count())
            .field("weighted_size", &self.cache.weighted_size())
            .finish()
    }
}

impl MokaAudioCache {
    /// Create a cache with custom configuration
    #[must_use]
    pub fn with_config(config: MokaAudioCacheConfig) -> Self {
        let max_capacity_bytes = config.max_capacity_mb * 1024 * 1024;

        let cache = Cache::builder()
            .max_capacity(max_capacity_bytes)
            .time_to_live(config.ttl)
            .weigher(|_key: &String, value: &Vec<u8>| -> u32 {
                // Weight by size in bytes, capped at u32::MAX
                value.len().try_into().unwrap_or(u32::MAX)
            })
            .build();

        Self { cache }
    }

    /// Number of live entries (approximate until pending tasks run)
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for MokaAudioCache {
    fn default() -> Self {
        Self::with_config(MokaAudioCacheConfig::default())
    }
}

#[async_trait]
impl AudioCachePort for MokaAudioCache {
    #[instrument(skip(self), level = "debug")]
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let hit = self.cache.get(key).await;
        debug!(key = %key, hit = hit.is_some(), "Cache lookup");
        Ok(hit)
    }

    #[instrument(skip(self, audio), fields(size = audio.len()), level = "debug")]
    async fn put(&self, key: &str, audio: &[u8]) -> Result<(), CacheError> {
        self.cache.insert(key.to_string(), audio.to_vec()).await;
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn sweep_expired(&self) -> Result<usize, CacheError> {
        let before = self.cache.entry_count();
        self.cache.run_pending_tasks().await;
        let removed = before.saturating_sub(self.cache.entry_count());
        Ok(usize::try_from(removed).unwrap_or(usize::MAX))
    }
}
