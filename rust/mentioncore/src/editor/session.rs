//! SuggestionSession: per-editor suggestion state
//!
//! Each editor mount constructs its own session and hands it to
//! `EditorBinding::new`, so two editors on one page never share popover state.
//! The session only records state; transitions are driven by the binding.

use crate::config::PopoverConfig;
use crate::suggest::{PopoverController, TriggerMatch};

// =============================================================================
// State Machine
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No popover
    Idle,
    /// Popover open over the given query span
    Open(TriggerMatch),
}

#[derive(Debug, Clone)]
pub struct SuggestionSession {
    key: String,
    state: SessionState,
    popover: PopoverController,
    opened: u64,
}

impl SuggestionSession {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            state: SessionState::Idle,
            popover: PopoverController::new(PopoverConfig::default()),
            opened: 0,
        }
    }

    /// Replace popover geometry and return to idle
    pub(crate) fn configure(&mut self, config: PopoverConfig) {
        self.popover = PopoverController::new(config);
        self.state = SessionState::Idle;
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, SessionState::Open(_))
    }

    pub fn active_match(&self) -> Option<&TriggerMatch> {
        match &self.state {
            SessionState::Open(m) => Some(m),
            SessionState::Idle => None,
        }
    }

    /// How many times this session has opened
    pub fn opened_count(&self) -> u64 {
        self.opened
    }

    pub fn popover(&self) -> &PopoverController {
        &self.popover
    }

    pub fn popover_mut(&mut self) -> &mut PopoverController {
        &mut self.popover
    }

    pub(crate) fn open(&mut self, m: TriggerMatch) {
        self.opened += 1;
        self.state = SessionState::Open(m);
    }

    /// Track the query span as the user types
    pub(crate) fn update(&mut self, m: TriggerMatch) {
        if self.is_open() {
            self.state = SessionState::Open(m);
        }
    }

    /// Returns true if the session was open
    pub(crate) fn close(&mut self) -> bool {
        let was_open = self.is_open();
        self.state = SessionState::Idle;
        was_open
    }
}
