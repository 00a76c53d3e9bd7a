//! Narrative analysis slot, preview truncation and expand/collapse state

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Text shown when narrative generation is switched off in settings
pub const DISABLED_PLACEHOLDER: &str = "AI analysis disabled in settings.";

const FAILURE_PREFIX: &str = "AI analysis failed: ";

/// Appended to a preview that drops part of the text
pub const ELLIPSIS: &str = "...";

static SENTENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^.!?]+[.!?]+").unwrap_or_else(|e| unreachable!("{e}")));

/// Settled value of the narrative slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Narrative {
    /// Markdown produced by the text-generation service
    Text(String),
    /// Generation switched off; carries the placeholder
    Disabled(String),
    /// Generation failed; carries a user-facing message
    Error(String),
}

impl Narrative {
    pub fn disabled() -> Self {
        Self::Disabled(DISABLED_PLACEHOLDER.to_string())
    }

    pub fn failed(reason: impl fmt::Display) -> Self {
        Self::Error(format!("{FAILURE_PREFIX}{reason}"))
    }

    /// The displayable string for any variant
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(text) | Self::Disabled(text) | Self::Error(text) => text,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// First sentence with an ellipsis, or the whole text when it is one sentence
    pub fn preview(&self) -> String {
        preview(self.as_str())
    }
}

impl fmt::Display for Narrative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split text into sentence units (runs ending in `.`, `!` or `?`)
pub fn sentence_units(text: &str) -> Vec<&str> {
    SENTENCE.find_iter(text).map(|m| m.as_str()).collect()
}

/// Preview of `text`: its first sentence unit plus `...` when more follows.
///
/// The unit's own terminal punctuation is replaced by the ellipsis.
pub fn preview(text: &str) -> String {
    let Some(first) = SENTENCE.find(text) else {
        return text.to_string();
    };

    let rest = &text[first.end()..];
    if rest.trim().is_empty() && text[..first.start()].trim().is_empty() {
        return text.to_string();
    }

    let sentence = first.as_str().trim().trim_end_matches(['.', '!', '?']);
    format!("{sentence}{ELLIPSIS}")
}

/// Collapsed/expanded state of a rendered narrative.
///
/// The underlying narrative is never mutated; only the visible rendering
/// switches between the preview and the full text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrativeView {
    narrative: Narrative,
    expanded: bool,
}

impl NarrativeView {
    pub fn new(narrative: Narrative) -> Self {
        Self {
            narrative,
            expanded: false,
        }
    }

    /// Whether the collapsed rendering hides any text
    pub fn is_truncated(&self) -> bool {
        self.narrative.preview() != self.narrative.as_str()
    }

    pub fn expand(&mut self) {
        self.expanded = true;
    }

    pub fn collapse(&mut self) {
        self.expanded = false;
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Text to render for the current state
    pub fn visible_text(&self) -> String {
        if self.expanded {
            self.narrative.as_str().to_string()
        } else {
            self.narrative.preview()
        }
    }

    pub fn narrative(&self) -> &Narrative {
        &self.narrative
    }
}
