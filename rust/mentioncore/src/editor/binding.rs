//! EditorBinding: document, suggestion session and mention channel in one place
//!
//! # State machine
//! `Idle` → `SuggestionOpen` when the caret sits right after a freshly typed
//! trigger char. `SuggestionOpen` → `Idle` on selection, Escape, or when the
//! caret leaves the query span (trigger deleted, query closed by whitespace).
//!
//! # Update pipeline
//! Every edit runs the same steps, in order:
//! 1. `TextChanged` if the plain-text projection changed
//! 2. re-extract mentions and offer them to the channel (`MentionsChanged`)
//! 3. re-detect the query span and update the session
//!
//! Host → editor sync (`set_text`) replaces the document wholesale and skips
//! step 1: the host already has that text.

use serde::{Deserialize, Serialize};

use super::document::EditorDocument;
use super::session::SuggestionSession;
use crate::config::EditorConfig;
use crate::console;
use crate::error::MentionError;
use crate::reference::{MetadataResponse, ReferenceData, ReferenceStore};
use crate::scanner::{HighlightSpan, Mention, MentionChannel, TokenCortex};
use crate::suggest::{
    KeyOutcome, Placement, PopoverKey, PopoverView, Rect, SuggestionItem, TriggerMatch,
    TriggerRules,
};

// =============================================================================
// Events
// =============================================================================

/// Notifications produced by a mutating call, in emission order
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorEvent {
    TextChanged { text: String },
    /// Sorted by id
    MentionsChanged { mentions: Vec<Mention> },
    SuggestionOpened { view: PopoverView },
    SuggestionUpdated { view: PopoverView },
    SuggestionClosed,
}

/// Result of routing a key press
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct KeyResponse {
    /// Host must call `preventDefault` when true
    pub handled: bool,
    pub events: Vec<EditorEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    Idle,
    SuggestionOpen,
}

// =============================================================================
// Token insertion
// =============================================================================

/// Renders the text that replaces the trigger-through-caret range
pub trait TokenInserter {
    fn render(&self, item: &SuggestionItem) -> String;
}

/// Canonical token followed by a single space
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalInserter;

impl TokenInserter for CanonicalInserter {
    fn render(&self, item: &SuggestionItem) -> String {
        format!("{} ", TokenCortex::canonical(item))
    }
}

// =============================================================================
// EditorBinding
// =============================================================================

pub struct EditorBinding {
    config: EditorConfig,
    rules: TriggerRules,
    document: EditorDocument,
    /// Char position in the plain-text projection
    caret: usize,
    session: SuggestionSession,
    cortex: TokenCortex,
    store: ReferenceStore,
    channel: MentionChannel,
    /// Last text the editor reported to (or received from) the host
    last_emitted_text: String,
    inserter: Box<dyn TokenInserter>,
}

impl EditorBinding {
    pub fn new(config: EditorConfig, mut session: SuggestionSession) -> Result<Self, MentionError> {
        config.validate()?;
        session.configure(config.popover.clone());
        Ok(Self {
            rules: TriggerRules::from(&config),
            config,
            document: EditorDocument::new(),
            caret: 0,
            session,
            cortex: TokenCortex::new(),
            store: ReferenceStore::new(),
            channel: MentionChannel::new(),
            last_emitted_text: String::new(),
            inserter: Box::new(CanonicalInserter),
        })
    }

    pub fn with_inserter(mut self, inserter: Box<dyn TokenInserter>) -> Self {
        self.inserter = inserter;
        self
    }

    fn log(&self, message: &str) {
        if self.config.debug {
            console::debug(&format!("[mentioncore:{}] {}", self.session.key(), message));
        }
    }

    // -------------------------------------------------------------------------
    // Reference data
    // -------------------------------------------------------------------------

    /// Install reference data, then re-scan so tokens typed while loading resolve
    pub fn hydrate(&mut self, data: ReferenceData) -> Result<Vec<EditorEvent>, MentionError> {
        let result = self.store.hydrate(data);
        if result.rebuilt {
            console::debug(&format!(
                "[mentioncore] reference data hydrated: {} records ({})",
                result.record_count, result.fingerprint
            ));
        }

        let mut events = Vec::new();
        let text = self.document.plain_text();
        self.emit_mentions(&text, &mut events)?;
        self.refresh_popover(&mut events);
        Ok(events)
    }

    /// Hydrate from the raw metadata response. A malformed payload is handled
    /// like a failed fetch; editing continues.
    pub fn hydrate_json(&mut self, json: &str) -> Result<Vec<EditorEvent>, MentionError> {
        match MetadataResponse::from_json(json) {
            Ok(response) => self.hydrate(response.data),
            Err(e) => Ok(self.fail_reference_fetch(&e.to_string())),
        }
    }

    /// A refetch started; existing data stays usable
    pub fn set_loading(&mut self, loading: bool) -> Vec<EditorEvent> {
        self.store.set_loading(loading);
        let mut events = Vec::new();
        self.refresh_popover(&mut events);
        events
    }

    /// The metadata fetch failed. The last hydrated snapshot keeps resolving
    /// tokens, so mentions already reported stay as they are.
    pub fn fail_reference_fetch(&mut self, reason: &str) -> Vec<EditorEvent> {
        console::warn(&format!("[mentioncore] reference fetch failed: {}", reason));
        self.store.fail(reason);
        let mut events = Vec::new();
        self.refresh_popover(&mut events);
        events
    }

    // -------------------------------------------------------------------------
    // Host → editor
    // -------------------------------------------------------------------------

    /// Host text prop changed. A no-op when the host echoes what the editor
    /// just emitted.
    pub fn set_text(&mut self, text: &str) -> Result<Vec<EditorEvent>, MentionError> {
        if text == self.last_emitted_text {
            return Ok(Vec::new());
        }
        let document = EditorDocument::from_plain_text(text);
        self.replace_document(document)
    }

    /// Host supplied editor HTML; same path as `set_text`
    pub fn set_html(&mut self, html: &str) -> Result<Vec<EditorEvent>, MentionError> {
        let document = EditorDocument::from_html(html);
        if document.plain_text() == self.last_emitted_text {
            return Ok(Vec::new());
        }
        self.replace_document(document)
    }

    fn replace_document(&mut self, document: EditorDocument) -> Result<Vec<EditorEvent>, MentionError> {
        let mut events = Vec::new();
        self.close_session(&mut events);

        self.document = document;
        self.caret = self.document.len();
        let text = self.document.plain_text();
        self.last_emitted_text = text.clone();

        self.emit_mentions(&text, &mut events)?;
        Ok(events)
    }

    /// Seed the channel with mentions the host already persisted
    pub fn prime_mentions(&mut self, mentions: Vec<Mention>) -> Result<(), MentionError> {
        self.channel.prime(mentions)
    }

    // -------------------------------------------------------------------------
    // Editing
    // -------------------------------------------------------------------------

    /// Type or paste at the caret
    pub fn insert_text(&mut self, text: &str) -> Result<Vec<EditorEvent>, MentionError> {
        self.caret = self.document.insert_text(self.caret, text)?;
        self.commit(Vec::new(), true)
    }

    /// Backspace
    pub fn delete_backward(&mut self) -> Result<Vec<EditorEvent>, MentionError> {
        if self.caret == 0 {
            return Ok(Vec::new());
        }
        self.document.delete(self.caret - 1, self.caret)?;
        self.caret -= 1;
        self.commit(Vec::new(), false)
    }

    pub fn delete_range(&mut self, start: usize, end: usize) -> Result<Vec<EditorEvent>, MentionError> {
        self.document.delete(start, end)?;
        self.caret = start;
        self.commit(Vec::new(), false)
    }

    /// Enter while idle
    pub fn split_block(&mut self) -> Result<Vec<EditorEvent>, MentionError> {
        self.caret = self.document.split_block(self.caret)?;
        self.commit(Vec::new(), false)
    }

    /// Shift+Enter. Splits the paragraph when hard breaks are disabled.
    pub fn insert_hard_break(&mut self) -> Result<Vec<EditorEvent>, MentionError> {
        self.caret = if self.config.hard_breaks {
            self.document.insert_hard_break(self.caret)?
        } else {
            self.document.split_block(self.caret)?
        };
        self.commit(Vec::new(), false)
    }

    pub fn set_caret(&mut self, pos: usize) -> Result<Vec<EditorEvent>, MentionError> {
        let len = self.document.len();
        if pos > len {
            return Err(MentionError::InvalidPosition { pos, len });
        }
        self.caret = pos;
        let mut events = Vec::new();
        let text = self.document.plain_text();
        self.sync_session(&text, false, &mut events);
        Ok(events)
    }

    // -------------------------------------------------------------------------
    // Suggestions
    // -------------------------------------------------------------------------

    /// Route a DOM key while the popover is open. Keys are never consumed when idle.
    pub fn key_down(&mut self, key: &str) -> Result<KeyResponse, MentionError> {
        if !self.session.is_open() {
            return Ok(KeyResponse { handled: false, events: Vec::new() });
        }

        let outcome = self.session.popover_mut().handle_key(PopoverKey::from_dom(key));
        let handled = outcome.is_handled();
        let events = match outcome {
            KeyOutcome::Ignored => Vec::new(),
            KeyOutcome::Handled => vec![EditorEvent::SuggestionUpdated {
                view: self.session.popover().view(),
            }],
            KeyOutcome::Dismissed => self.dismiss_suggestion(),
            KeyOutcome::Chosen(item) => self.choose(&item)?,
        };
        Ok(KeyResponse { handled, events })
    }

    /// Insert the highlighted item
    pub fn select_suggestion(&mut self) -> Result<Vec<EditorEvent>, MentionError> {
        match self.session.popover().selected_item().cloned() {
            Some(item) => self.choose(&item),
            None => Ok(Vec::new()),
        }
    }

    /// Replace the trigger-through-caret range with the item's token
    pub fn choose(&mut self, item: &SuggestionItem) -> Result<Vec<EditorEvent>, MentionError> {
        let Some(active) = self.session.active_match().cloned() else {
            return Ok(Vec::new());
        };
        let token = self.inserter.render(item);
        self.caret = self.document.replace(active.start, active.end, &token)?;

        let mut events = Vec::new();
        self.close_session(&mut events);
        self.commit(events, false)
    }

    /// Escape
    pub fn dismiss_suggestion(&mut self) -> Vec<EditorEvent> {
        let mut events = Vec::new();
        self.close_session(&mut events);
        events
    }

    /// Trigger rect moved (scroll, resize)
    pub fn reposition(&mut self, anchor: &Rect) -> Option<Placement> {
        if !self.session.is_open() {
            return None;
        }
        Some(self.session.popover_mut().reposition(anchor))
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    pub fn text(&self) -> String {
        self.document.plain_text()
    }

    pub fn html(&self) -> String {
        self.document.to_html()
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn document(&self) -> &EditorDocument {
        &self.document
    }

    /// Last set reported to the host, sorted by id
    pub fn mentions(&self) -> &[Mention] {
        self.channel.last()
    }

    pub fn highlights(&self) -> Vec<HighlightSpan> {
        self.cortex.highlight(&self.document.plain_text(), self.store.index())
    }

    pub fn suggestion_view(&self) -> Option<PopoverView> {
        self.session.is_open().then(|| self.session.popover().view())
    }

    pub fn state(&self) -> BindingState {
        if self.session.is_open() {
            BindingState::SuggestionOpen
        } else {
            BindingState::Idle
        }
    }

    pub fn session(&self) -> &SuggestionSession {
        &self.session
    }

    pub fn store(&self) -> &ReferenceStore {
        &self.store
    }

    pub fn channel(&self) -> &MentionChannel {
        &self.channel
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Pipeline
    // -------------------------------------------------------------------------

    fn commit(&mut self, mut events: Vec<EditorEvent>, may_open: bool) -> Result<Vec<EditorEvent>, MentionError> {
        let text = self.document.plain_text();
        if text != self.last_emitted_text {
            self.last_emitted_text = text.clone();
            events.push(EditorEvent::TextChanged { text: text.clone() });
        }
        self.emit_mentions(&text, &mut events)?;
        self.sync_session(&text, may_open, &mut events);
        Ok(events)
    }

    fn emit_mentions(&mut self, text: &str, events: &mut Vec<EditorEvent>) -> Result<(), MentionError> {
        // Nothing resolves before the first snapshot; hydrate re-scans
        if !self.store.is_hydrated() {
            return Ok(());
        }
        let scan = self.cortex.extract(text, self.store.index());
        if let Some(mentions) = self.channel.offer(scan.mentions)? {
            events.push(EditorEvent::MentionsChanged { mentions });
        }
        Ok(())
    }

    fn sync_session(&mut self, text: &str, may_open: bool, events: &mut Vec<EditorEvent>) {
        let found = self.rules.find(text, self.caret);

        if let Some(active_start) = self.session.active_match().map(|m| m.start) {
            match found {
                Some(m) if m.start == active_start => {
                    self.refresh_query(&m.query);
                    self.session.update(m);
                    events.push(EditorEvent::SuggestionUpdated {
                        view: self.session.popover().view(),
                    });
                }
                _ => self.close_session(events),
            }
            return;
        }

        if !may_open {
            return;
        }
        if let Some(m) = found.filter(|m| m.query.is_empty() && m.end == self.caret) {
            self.open_session(m, events);
        }
    }

    fn open_session(&mut self, m: TriggerMatch, events: &mut Vec<EditorEvent>) {
        self.refresh_query(&m.query);
        self.log(&format!("suggestion open at {}", m.start));
        self.session.open(m);
        events.push(EditorEvent::SuggestionOpened {
            view: self.session.popover().view(),
        });
    }

    fn close_session(&mut self, events: &mut Vec<EditorEvent>) {
        if self.session.close() {
            self.log("suggestion closed");
            events.push(EditorEvent::SuggestionClosed);
        }
    }

    fn refresh_query(&mut self, query: &str) {
        let loading = self.store.is_loading();
        let max = self.config.max_items_per_group;
        self.session
            .popover_mut()
            .refresh(self.store.catalog(), query, loading, max);
    }

    /// Re-filter the open popover after the catalog or loading flag changed
    fn refresh_popover(&mut self, events: &mut Vec<EditorEvent>) {
        let Some(query) = self.session.active_match().map(|m| m.query.clone()) else {
            return;
        };
        self.refresh_query(&query);
        events.push(EditorEvent::SuggestionUpdated {
            view: self.session.popover().view(),
        });
    }
}
