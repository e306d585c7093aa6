//! Trigger detection: locate the open query span behind the caret
//!
//! The span runs from the last trigger char on the caret's line up to the
//! caret. Any character may precede the trigger. With `allow_spaces` the
//! query may contain single spaces; it ends at a leading space, a double
//! space, or a line break.

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;

/// An open query span. Positions are chars in the plain-text projection.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TriggerMatch {
    /// Position of the trigger char
    pub start: usize,
    /// Caret position (exclusive end of the span)
    pub end: usize,
    /// Text typed after the trigger char
    pub query: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerRules {
    pub trigger_char: char,
    pub allow_spaces: bool,
}

impl From<&EditorConfig> for TriggerRules {
    fn from(config: &EditorConfig) -> Self {
        Self {
            trigger_char: config.trigger_char,
            allow_spaces: config.allow_spaces,
        }
    }
}

impl TriggerRules {
    fn query_is_open(&self, query: &[char]) -> bool {
        if !self.allow_spaces {
            return !query.iter().any(|c| c.is_whitespace());
        }
        if query.first().map_or(false, |c| c.is_whitespace()) {
            return false;
        }
        !query
            .windows(2)
            .any(|pair| pair[0].is_whitespace() && pair[1].is_whitespace())
    }

    /// Find the query span ending at `caret`, if one is open
    pub fn find(&self, text: &str, caret: usize) -> Option<TriggerMatch> {
        let before: Vec<char> = text.chars().take(caret).collect();
        if before.len() < caret {
            return None;
        }

        let line_start = before
            .iter()
            .rposition(|&c| c == '\n')
            .map(|p| p + 1)
            .unwrap_or(0);
        let line = &before[line_start..];
        let trigger_at = line.iter().rposition(|&c| c == self.trigger_char)?;
        let query = &line[trigger_at + 1..];

        if !self.query_is_open(query) {
            return None;
        }

        Some(TriggerMatch {
            start: line_start + trigger_at,
            end: caret,
            query: query.iter().collect(),
        })
    }
}
