//! Emotion heuristic for cloud synthesis
//!
//! Picks a coarse tone from punctuation density and warning vocabulary and
//! maps it to a voice, a speed factor and light text formatting.

use std::sync::LazyLock;

use aho_corasick::AhoCorasick;

const WARNING_KEYWORDS: &[&str] = &[
    "warning",
    "danger",
    "careful",
    "attention",
    "important",
    "caution",
    "stop",
];

static WARNING_MATCHER: LazyLock<AhoCorasick> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // Infallible with valid static patterns
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(WARNING_KEYWORDS)
        .expect("valid warning keyword patterns")
});

/// Share of sentences that must carry a marker to flip the tone
const DENSITY_THRESHOLD: f32 = 0.5;

/// Coarse emotional tone of an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emotion {
    /// No strong signal
    Neutral,
    /// Many exclamations
    Excited,
    /// Warning vocabulary
    Urgent,
    /// Many questions
    Questioning,
}

/// How an emotion changes synthesis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceProfile {
    /// Voice to use unless the caller named one
    pub voice: Option<&'static str>,
    /// Multiplier applied to the requested speed
    pub speed_factor: f32,
}

impl Emotion {
    /// Detect the tone of `text`
    #[must_use]
    pub fn detect(text: &str) -> Self {
        if has_warning_word(text) {
            return Self::Urgent;
        }

        let exclamations = text.matches('!').count();
        let questions = text.matches('?').count();
        let sentences = sentence_count(text);

        if density(exclamations, sentences) >= DENSITY_THRESHOLD {
            Self::Excited
        } else if density(questions, sentences) >= DENSITY_THRESHOLD {
            Self::Questioning
        } else {
            Self::Neutral
        }
    }

    /// Synthesis adjustments for this tone
    #[must_use]
    pub const fn profile(self) -> VoiceProfile {
        match self {
            Self::Neutral => VoiceProfile {
                voice: None,
                speed_factor: 1.0,
            },
            Self::Excited => VoiceProfile {
                voice: Some("shimmer"),
                speed_factor: 1.1,
            },
            Self::Urgent => VoiceProfile {
                voice: Some("onyx"),
                speed_factor: 0.9,
            },
            Self::Questioning => VoiceProfile {
                voice: Some("alloy"),
                speed_factor: 1.0,
            },
        }
    }

    /// Adjust punctuation so the synthesizer renders the tone
    #[must_use]
    pub fn format_text(self, text: &str) -> String {
        match self {
            Self::Excited => collapse_repeats(text, '!'),
            Self::Questioning => collapse_repeats(text, '?'),
            Self::Urgent => {
                let trimmed = text.trim_end();
                if trimmed.ends_with(['.', '!', '?']) {
                    trimmed.to_string()
                } else {
                    format!("{trimmed}!")
                }
            },
            Self::Neutral => text.to_string(),
        }
    }

    /// Lowercase label for logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Excited => "excited",
            Self::Urgent => "urgent",
            Self::Questioning => "questioning",
        }
    }
}

/// Whether a warning keyword occurs as a whole word
fn has_warning_word(text: &str) -> bool {
    let is_word_char = |c: char| c.is_alphanumeric() || c == '_';
    WARNING_MATCHER.find_iter(text).any(|m| {
        let before = text[..m.start()].chars().next_back();
        let after = text[m.end()..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}

fn sentence_count(text: &str) -> usize {
    let mut count = 0;
    let mut in_sentence = false;
    for c in text.chars() {
        if matches!(c, '.' | '!' | '?') {
            if in_sentence {
                count += 1;
            }
            in_sentence = false;
        } else if !c.is_whitespace() {
            in_sentence = true;
        }
    }
    if in_sentence {
        count += 1;
    }
    count.max(1)
}

#[allow(clippy::cast_precision_loss)]
fn density(markers: usize, sentences: usize) -> f32 {
    markers.min(sentences) as f32 / sentences as f32
}

fn collapse_repeats(text: &str, mark: char) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous = None;
    for c in text.chars() {
        if c == mark && previous == Some(mark) {
            continue;
        }
        out.push(c);
        previous = Some(c);
    }
    out
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::Emotion;

    proptest! {
        #[test]
        fn excited_formatting_leaves_no_repeats(text in "[a-z !?.]{0,40}") {
            let formatted = Emotion::Excited.format_text(&text);
            prop_assert!(!formatted.contains("!!"));
        }

        #[test]
        fn detection_never_panics(text in "\\PC{0,64}") {
            let _ = Emotion::detect(&text).profile();
        }
    }
}
