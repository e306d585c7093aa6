//! Configuration types and defaults for the mention editor

use serde::{Deserialize, Serialize};

use crate::error::MentionError;

// =============================================================================
// Popover Geometry
// =============================================================================

/// Placement parameters for the suggestion overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PopoverConfig {
    /// Gap between the trigger rect's bottom edge and the overlay. Default: 8.0
    pub offset: f64,
    /// Lower bound of the overlay width. Default: 280.0
    pub min_width: f64,
    /// Upper bound of the overlay width. Default: 420.0
    pub max_width: f64,
}

impl Default for PopoverConfig {
    fn default() -> Self {
        Self {
            offset: 8.0,
            min_width: 280.0,
            max_width: 420.0,
        }
    }
}

// =============================================================================
// Editor Configuration
// =============================================================================

/// Mention editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Character that opens the suggestion popover. Default: '@'
    pub trigger_char: char,
    /// Allow spaces inside an open query (multi-word search). Default: true
    pub allow_spaces: bool,
    /// Shift+Enter inserts a line-break node instead of a new paragraph. Default: true
    pub hard_breaks: bool,
    /// Cap on items per suggestion group after filtering. Default: None
    pub max_items_per_group: Option<usize>,
    /// Log suggestion session transitions to the console. Default: false
    pub debug: bool,
    pub popover: PopoverConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            trigger_char: '@',
            allow_spaces: true,
            hard_breaks: true,
            max_items_per_group: None,
            debug: false,
            popover: PopoverConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Single-line editor variant: Shift+Enter behaves like Enter
    pub fn compact() -> Self {
        Self {
            hard_breaks: false,
            ..Self::default()
        }
    }

    /// Parse camelCase JSON, defaulting missing fields
    pub fn from_json(json: &str) -> Result<Self, MentionError> {
        let config: EditorConfig =
            serde_json::from_str(json).map_err(|e| MentionError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MentionError> {
        if self.trigger_char.is_whitespace() {
            return Err(MentionError::Config(
                "trigger character must not be whitespace".to_string(),
            ));
        }
        let popover = &self.popover;
        if !(popover.offset >= 0.0) {
            return Err(MentionError::Config(format!(
                "popover offset must be non-negative, got {}",
                popover.offset
            )));
        }
        if !(popover.min_width > 0.0) || popover.min_width > popover.max_width {
            return Err(MentionError::Config(format!(
                "popover width bounds invalid: min {} max {}",
                popover.min_width, popover.max_width
            )));
        }
        Ok(())
    }
}
