//! Audio cache port
//!
//! Content-addressed storage for synthesized speech. Keys are blake3 hex
//! digests computed by the TTS layer; values are raw audio bytes.
//! Implementations own the entry lifetime (TTL) and eviction.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

/// Errors raised by audio cache backends
///
/// Callers treat every cache error as a miss.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Filesystem failure
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Key cannot be stored by this backend
    #[error("invalid cache key '{0}'")]
    InvalidKey(String),

    /// Any other backend failure
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// Port for the TTS audio cache
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AudioCachePort: Send + Sync {
    /// Fetch a live entry
    ///
    /// Returns `None` if the key is unknown or its entry has expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store an entry, replacing any previous value
    async fn put(&self, key: &str, audio: &[u8]) -> Result<(), CacheError>;

    /// Remove every expired entry and return how many were removed
    async fn sweep_expired(&self) -> Result<usize, CacheError>;
}
