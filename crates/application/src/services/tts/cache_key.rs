//! Content-addressed keys for synthesized audio

/// Everything that changes the synthesized audio
#[derive(Debug, Clone, Copy)]
pub struct TtsCacheParams<'a> {
    /// Text sent to the synthesizer
    pub text: &'a str,
    /// Target language tag
    pub language: &'a str,
    /// Resolved voice
    pub voice: &'a str,
    /// Resolved speed
    pub speed: f32,
    /// Whether emotion preservation was requested
    pub preserve_emotions: bool,
}

/// Compute the blake3 hex key for a synthesis request
///
/// Speed is quantized to two decimals so float noise does not split
/// entries.
#[must_use]
pub fn tts_cache_key(params: &TtsCacheParams<'_>) -> String {
    let speed = format!("{:.2}", params.speed);
    let emotions = if params.preserve_emotions { "1" } else { "0" };

    let mut hasher = blake3::Hasher::new();
    for component in [
        params.language,
        params.voice,
        speed.as_str(),
        emotions,
        params.text,
    ] {
        hasher.update(component.as_bytes());
        hasher.update(b"|"); // Separator to avoid collisions
    }
    hasher.finalize().to_hex().to_string()
}
