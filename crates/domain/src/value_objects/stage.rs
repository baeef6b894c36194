//! Pipeline stage and run state

use std::fmt;

use serde::{Deserialize, Serialize};

/// One processing stage of the speech pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Speech-to-text
    Stt,
    /// Text translation
    Translation,
    /// Speech synthesis
    Tts,
}

impl Stage {
    /// Short label used in logs, metrics and error payloads
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stt => "stt",
            Self::Translation => "translation",
            Self::Tts => "tts",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a single pipeline run
///
/// ```text
/// Idle ─▶ Transcribing ─▶ Translating ─▶ Synthesizing ─▶ Done
///              │               │               │
///              └───────────────┴───────────────┴──▶ Failed(stage)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    /// Nothing started yet
    Idle,
    /// Running the STT chain
    Transcribing,
    /// Running the translation chain
    Translating,
    /// Running the selected TTS strategy
    Synthesizing,
    /// Result packaged
    Done,
    /// A stage failed without recovery
    Failed(Stage),
}

impl PipelineState {
    /// The stage this state is working on, if any
    #[must_use]
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::Transcribing => Some(Stage::Stt),
            Self::Translating => Some(Stage::Translation),
            Self::Synthesizing => Some(Stage::Tts),
            Self::Failed(stage) => Some(*stage),
            Self::Idle | Self::Done => None,
        }
    }

    /// Whether no further transitions are possible
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }

    /// Whether `next` is a legal successor of this state
    #[must_use]
    pub fn can_transition_to(&self, next: Self) -> bool {
        match (self, next) {
            // STT is bypassed when text arrives pre-transcribed
            (Self::Idle, Self::Transcribing | Self::Translating)
            | (Self::Transcribing, Self::Translating)
            | (Self::Translating, Self::Synthesizing)
            | (Self::Synthesizing, Self::Done) => true,
            (current, Self::Failed(stage)) => current.stage() == Some(stage) && !current.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Transcribing => write!(f, "transcribing"),
            Self::Translating => write!(f, "translating"),
            Self::Synthesizing => write!(f, "synthesizing"),
            Self::Done => write!(f, "done"),
            Self::Failed(stage) => write!(f, "failed({stage})"),
        }
    }
}
