//! Whisper.cpp Local Speech-to-Text Provider
//!
//! Last resort in the STT chain: runs the whisper.cpp CLI on the host and
//! reads the transcript from stdout. Needs no credentials, so it always
//! reports itself as configured; a missing binary surfaces as
//! `SpeechError::NotAvailable` at call time.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error, instrument, warn};

use crate::config::WhisperCppConfig;
use crate::error::SpeechError;
use crate::ports::SpeechToText;
use crate::types::{AudioData, Transcription};

/// Local STT provider using whisper.cpp
#[derive(Debug, Clone)]
pub struct WhisperCppProvider {
    config: WhisperCppConfig,
}

impl WhisperCppProvider {
    /// Create a new whisper.cpp provider
    #[must_use]
    pub const fn new(config: WhisperCppConfig) -> Self {
        Self { config }
    }

    fn executable(&self) -> &Path {
        &self.config.executable_path
    }

    fn model(&self) -> &Path {
        &self.config.model_path
    }

    fn build_command(&self, audio_path: &Path, language: Option<&str>) -> Command {
        let mut cmd = Command::new(self.executable());
        cmd.arg("-m")
            .arg(self.model())
            .arg("-f")
            .arg(audio_path)
            .arg("-nt")
            .arg("-np")
            .arg("-t")
            .arg(self.config.threads.to_string());

        if let Some(lang) = language.or(self.config.default_language.as_deref()) {
            cmd.arg("-l").arg(lang);
        }

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    /// Write audio to a temp file named with the container's extension
    async fn write_temp_audio(audio: &AudioData) -> Result<NamedTempFile, SpeechError> {
        let suffix = format!(".{}", audio.format().extension());
        let temp_file = NamedTempFile::with_suffix(suffix).map_err(|e| {
            SpeechError::TranscriptionFailed(format!("Failed to create temp file: {e}"))
        })?;

        let mut file = tokio::fs::File::create(temp_file.path()).await.map_err(|e| {
            SpeechError::TranscriptionFailed(format!("Failed to write temp file: {e}"))
        })?;

        file.write_all(audio.data()).await.map_err(|e| {
            SpeechError::TranscriptionFailed(format!("Failed to write audio data: {e}"))
        })?;

        file.flush().await.map_err(|e| {
            SpeechError::TranscriptionFailed(format!("Failed to flush temp file: {e}"))
        })?;

        Ok(temp_file)
    }

    #[instrument(skip(self, audio_path), fields(model = %self.model().display()))]
    async fn run_whisper(
        &self,
        audio_path: &Path,
        language: Option<&str>,
    ) -> Result<String, SpeechError> {
        let output = self
            .build_command(audio_path, language)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SpeechError::NotAvailable(format!(
                        "whisper.cpp not found at '{}'",
                        self.executable().display()
                    ))
                } else {
                    SpeechError::TranscriptionFailed(format!("Failed to run whisper.cpp: {e}"))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(status = %output.status, stderr = %stderr.trim(), "whisper.cpp failed");
            return Err(SpeechError::TranscriptionFailed(format!(
                "whisper.cpp exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl SpeechToText for WhisperCppProvider {
    #[instrument(skip(self, audio), fields(format = ?audio.format(), audio_size = audio.size_bytes()))]
    async fn transcribe(
        &self,
        audio: AudioData,
        language: Option<&str>,
    ) -> Result<Transcription, SpeechError> {
        if audio.is_empty() {
            return Err(SpeechError::InvalidAudio("Audio data is empty".to_string()));
        }

        // Dropping the handle removes the file.
        let temp_file = Self::write_temp_audio(&audio).await?;
        let text = self.run_whisper(temp_file.path(), language).await?;

        if text.is_empty() {
            warn!("whisper.cpp returned empty transcription");
        } else {
            debug!(text_len = text.len(), "Transcription complete");
        }

        let mut transcription = Transcription::new(text);
        if let Some(lang) = language.or(self.config.default_language.as_deref()) {
            transcription = transcription.with_language(lang);
        }
        if let Some(duration_ms) = audio.duration_ms() {
            transcription = transcription.with_duration(duration_ms);
        }
        Ok(transcription)
    }

    fn provider_name(&self) -> &str {
        "whisper-cpp"
    }

    fn is_configured(&self) -> bool {
        true
    }

    fn model_name(&self) -> &str {
        self.model()
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("whisper.cpp")
    }
}
