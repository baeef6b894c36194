//! Periodic eviction of expired TTS audio

use std::{sync::Arc, time::Duration};

use application::ports::AudioCachePort;
use tracing::{debug, error, info};

/// Spawn a background task that sweeps expired cache entries.
///
/// The first sweep runs one `interval` after startup. Returns a `JoinHandle`
/// that can be used to abort the task when shutting down.
///
/// # Example
///
/// ```ignore
/// let sweep_handle = spawn_sweep_task(cache, Duration::from_secs(3600));
///
/// // On shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task(
    cache: Arc<dyn AudioCachePort>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    info!(interval_secs = interval.as_secs(), "Starting TTS cache sweep task");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // Don't run immediately on startup
        ticker.tick().await;

        loop {
            ticker.tick().await;

            match cache.sweep_expired().await {
                Ok(removed) if removed > 0 => {
                    info!(removed_count = removed, "Swept expired TTS audio");
                },
                Ok(_) => debug!("No expired TTS audio"),
                Err(e) => error!(error = %e, "Failed to sweep TTS cache"),
            }
        }
    })
}
