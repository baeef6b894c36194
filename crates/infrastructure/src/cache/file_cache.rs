//! File-backed TTS audio cache
//!
//! One `<key>.audio` file per utterance. Entries older than the TTL are
//! treated as misses and removed on read; `sweep_expired` removes the rest.
//! Writes go to a uniquely named temp file in the cache directory and are
//! renamed into place, so readers only ever see complete entries.

use std::{
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use application::ports::{AudioCachePort, CacheError};
use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, instrument, warn};

/// Extension of cache entries
const ENTRY_EXTENSION: &str = "audio";

/// Longest accepted key (blake3 hex is 64)
const MAX_KEY_LEN: usize = 128;

/// Audio cache stored as files in one directory
#[derive(Debug, Clone)]
pub struct FileAudioCache {
    dir: PathBuf,
    ttl: Duration,
}

impl FileAudioCache {
    /// Open (and create if needed) a cache directory
    pub async fn open(dir: impl Into<PathBuf>, ttl: Duration) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        debug!(dir = %dir.display(), ttl_secs = ttl.as_secs(), "File audio cache opened");
        Ok(Self { dir, ttl })
    }

    /// Cache directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf, CacheError> {
        if key.is_empty() || key.len() > MAX_KEY_LEN || !key.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(CacheError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.{ENTRY_EXTENSION}")))
    }

    fn is_expired(&self, modified: SystemTime) -> bool {
        SystemTime::now()
            .duration_since(modified)
            .unwrap_or_default()
            > self.ttl
    }
}

#[async_trait]
impl AudioCachePort for FileAudioCache {
    #[instrument(skip(self), level = "debug")]
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.entry_path(key)?;

        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(key = %key, "Cache miss");
                return Ok(None);
            },
            Err(e) => return Err(e.into()),
        };

        if self.is_expired(metadata.modified()?) {
            debug!(key = %key, "Cache entry expired");
            if let Err(e) = fs::remove_file(&path).await
                && e.kind() != ErrorKind::NotFound
            {
                warn!(key = %key, error = %e, "Failed to remove expired cache entry");
            }
            return Ok(None);
        }

        match fs::read(&path).await {
            Ok(audio) => {
                debug!(key = %key, size = audio.len(), "Cache hit");
                Ok(Some(audio))
            },
            // Swept between metadata and read
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, audio), fields(size = audio.len()), level = "debug")]
    async fn put(&self, key: &str, audio: &[u8]) -> Result<(), CacheError> {
        let path = self.entry_path(key)?;
        let dir = self.dir.clone();
        let audio = audio.to_vec();

        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut partial = tempfile::Builder::new()
                .prefix(".")
                .suffix(".partial")
                .tempfile_in(&dir)?;
            partial.write_all(&audio)?;
            partial.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| CacheError::Backend(format!("cache write task failed: {e}")))??;

        debug!(key = %key, "Cache entry written");
        Ok(())
    }

    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn sweep_expired(&self) -> Result<usize, CacheError> {
        let mut entries = fs::read_dir(&self.dir).await?;
        let mut removed = 0;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(ENTRY_EXTENSION) {
                continue;
            }

            let modified = match entry.metadata().await.and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable cache entry");
                    continue;
                },
            };

            if self.is_expired(modified) {
                match fs::remove_file(&path).await {
                    Ok(()) => removed += 1,
                    Err(e) if e.kind() == ErrorKind::NotFound => {},
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Failed to remove cache entry");
                    },
                }
            }
        }

        debug!(removed, "Cache sweep finished");
        Ok(removed)
    }
}
