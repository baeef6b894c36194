//! TTS service type selected per request

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// How synthesized speech is delivered to listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsServiceType {
    /// Listener's browser speaks the text; the server only emits a marker
    #[default]
    Browser,
    /// Server-side synthesis through a cloud vendor
    Cloud,
    /// No audio at all
    Silent,
}

impl TtsServiceType {
    /// Wire name of the strategy
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::Cloud => "cloud",
            Self::Silent => "silent",
        }
    }

    /// Whether this strategy may call a network provider
    #[must_use]
    pub const fn uses_network(&self) -> bool {
        matches!(self, Self::Cloud)
    }
}

impl fmt::Display for TtsServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TtsServiceType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "browser" => Ok(Self::Browser),
            "cloud" | "openai" => Ok(Self::Cloud),
            "silent" | "none" => Ok(Self::Silent),
            _ => Err(DomainError::UnknownTtsService(s.to_string())),
        }
    }
}
