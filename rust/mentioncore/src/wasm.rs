//! JS facade over `EditorBinding`
//!
//! Mutating methods return the produced events as a JS array and also
//! dispatch `TextChanged` / `MentionsChanged` to the registered callbacks.
//! Positions are chars of the plain-text projection.

use wasm_bindgen::prelude::*;

use crate::config::EditorConfig;
use crate::console;
use crate::editor::{EditorBinding, EditorEvent, SuggestionSession};
use crate::error::MentionError;
use crate::reference::{MetadataResponse, ReferenceIndex};
use crate::scanner::{extract_mentions, Mention, TokenCortex};
use crate::suggest::{Rect, SuggestionItem};

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn index_from_metadata(metadata: JsValue) -> Result<ReferenceIndex, JsValue> {
    let response: MetadataResponse = serde_wasm_bindgen::from_value(metadata).map_err(to_js)?;
    Ok(ReferenceIndex::build(response.data))
}

// =============================================================================
// MentionEditor
// =============================================================================

#[wasm_bindgen]
pub struct MentionEditor {
    inner: EditorBinding,
    on_text_change: Option<js_sys::Function>,
    on_mentions_change: Option<js_sys::Function>,
}

#[wasm_bindgen]
impl MentionEditor {
    /// `config` may be undefined for defaults
    #[wasm_bindgen(constructor)]
    pub fn new(session_key: &str, config: JsValue) -> Result<MentionEditor, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value::<EditorConfig>(config).map_err(to_js)?
        };
        let inner = EditorBinding::new(config, SuggestionSession::new(session_key)).map_err(to_js)?;
        Ok(MentionEditor {
            inner,
            on_text_change: None,
            on_mentions_change: None,
        })
    }

    #[wasm_bindgen(js_name = onTextChange)]
    pub fn on_text_change(&mut self, callback: Option<js_sys::Function>) {
        self.on_text_change = callback;
    }

    #[wasm_bindgen(js_name = onMentionsChange)]
    pub fn on_mentions_change(&mut self, callback: Option<js_sys::Function>) {
        self.on_mentions_change = callback;
    }

    fn dispatch(&self, events: &[EditorEvent]) {
        for event in events {
            let (callback, arg) = match event {
                EditorEvent::TextChanged { text } => (&self.on_text_change, JsValue::from_str(text)),
                EditorEvent::MentionsChanged { mentions } => {
                    match serde_wasm_bindgen::to_value(mentions) {
                        Ok(value) => (&self.on_mentions_change, value),
                        Err(e) => {
                            console::error(&format!("[mentioncore] mention serialization failed: {}", e));
                            continue;
                        }
                    }
                }
                _ => continue,
            };
            if let Some(callback) = callback {
                if let Err(e) = callback.call1(&JsValue::NULL, &arg) {
                    console::error(&format!("[mentioncore] host callback threw: {:?}", e));
                }
            }
        }
    }

    fn finish(&self, result: Result<Vec<EditorEvent>, MentionError>) -> Result<JsValue, JsValue> {
        let events = result.map_err(to_js)?;
        self.dispatch(&events);
        serde_wasm_bindgen::to_value(&events).map_err(to_js)
    }

    // ========================================================================
    // Reference data
    // ========================================================================

    /// Accepts the metadata response envelope `{ data: { apis, functions, models } }`
    pub fn hydrate(&mut self, metadata: JsValue) -> Result<JsValue, JsValue> {
        let response: MetadataResponse = match serde_wasm_bindgen::from_value(metadata) {
            Ok(response) => response,
            Err(e) => {
                let events = self.inner.fail_reference_fetch(&e.to_string());
                return self.finish(Ok(events));
            }
        };
        let result = self.inner.hydrate(response.data);
        self.finish(result)
    }

    #[wasm_bindgen(js_name = hydrateJson)]
    pub fn hydrate_json(&mut self, json: &str) -> Result<JsValue, JsValue> {
        let result = self.inner.hydrate_json(json);
        self.finish(result)
    }

    #[wasm_bindgen(js_name = setLoading)]
    pub fn set_loading(&mut self, loading: bool) -> Result<JsValue, JsValue> {
        let events = self.inner.set_loading(loading);
        self.finish(Ok(events))
    }

    #[wasm_bindgen(js_name = failReferenceFetch)]
    pub fn fail_reference_fetch(&mut self, reason: &str) -> Result<JsValue, JsValue> {
        let events = self.inner.fail_reference_fetch(reason);
        self.finish(Ok(events))
    }

    // ========================================================================
    // Host sync
    // ========================================================================

    #[wasm_bindgen(js_name = setText)]
    pub fn set_text(&mut self, text: &str) -> Result<JsValue, JsValue> {
        let result = self.inner.set_text(text);
        self.finish(result)
    }

    #[wasm_bindgen(js_name = setHtml)]
    pub fn set_html(&mut self, html: &str) -> Result<JsValue, JsValue> {
        let result = self.inner.set_html(html);
        self.finish(result)
    }

    #[wasm_bindgen(js_name = primeMentions)]
    pub fn prime_mentions(&mut self, mentions: JsValue) -> Result<(), JsValue> {
        let mentions: Vec<Mention> = serde_wasm_bindgen::from_value(mentions).map_err(to_js)?;
        self.inner.prime_mentions(mentions).map_err(to_js)
    }

    // ========================================================================
    // Editing
    // ========================================================================

    #[wasm_bindgen(js_name = insertText)]
    pub fn insert_text(&mut self, text: &str) -> Result<JsValue, JsValue> {
        let result = self.inner.insert_text(text);
        self.finish(result)
    }

    #[wasm_bindgen(js_name = deleteBackward)]
    pub fn delete_backward(&mut self) -> Result<JsValue, JsValue> {
        let result = self.inner.delete_backward();
        self.finish(result)
    }

    #[wasm_bindgen(js_name = deleteRange)]
    pub fn delete_range(&mut self, start: usize, end: usize) -> Result<JsValue, JsValue> {
        let result = self.inner.delete_range(start, end);
        self.finish(result)
    }

    #[wasm_bindgen(js_name = splitBlock)]
    pub fn split_block(&mut self) -> Result<JsValue, JsValue> {
        let result = self.inner.split_block();
        self.finish(result)
    }

    #[wasm_bindgen(js_name = insertHardBreak)]
    pub fn insert_hard_break(&mut self) -> Result<JsValue, JsValue> {
        let result = self.inner.insert_hard_break();
        self.finish(result)
    }

    #[wasm_bindgen(js_name = setCaret)]
    pub fn set_caret(&mut self, pos: usize) -> Result<JsValue, JsValue> {
        let result = self.inner.set_caret(pos);
        self.finish(result)
    }

    // ========================================================================
    // Suggestions
    // ========================================================================

    /// Returns true when the host must `preventDefault`
    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&mut self, key: &str) -> Result<bool, JsValue> {
        let response = self.inner.key_down(key).map_err(to_js)?;
        self.dispatch(&response.events);
        Ok(response.handled)
    }

    #[wasm_bindgen(js_name = selectSuggestion)]
    pub fn select_suggestion(&mut self) -> Result<JsValue, JsValue> {
        let result = self.inner.select_suggestion();
        self.finish(result)
    }

    pub fn choose(&mut self, item: JsValue) -> Result<JsValue, JsValue> {
        let item: SuggestionItem = serde_wasm_bindgen::from_value(item).map_err(to_js)?;
        let result = self.inner.choose(&item);
        self.finish(result)
    }

    #[wasm_bindgen(js_name = dismissSuggestion)]
    pub fn dismiss_suggestion(&mut self) -> Result<JsValue, JsValue> {
        let events = self.inner.dismiss_suggestion();
        self.finish(Ok(events))
    }

    /// Call on window scroll/resize (capture phase) with the trigger's client rect
    pub fn reposition(&mut self, rect: JsValue) -> Result<JsValue, JsValue> {
        let rect: Rect = serde_wasm_bindgen::from_value(rect).map_err(to_js)?;
        match self.inner.reposition(&rect) {
            Some(placement) => serde_wasm_bindgen::to_value(&placement).map_err(to_js),
            None => Ok(JsValue::NULL),
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn text(&self) -> String {
        self.inner.text()
    }

    pub fn html(&self) -> String {
        self.inner.html()
    }

    pub fn caret(&self) -> usize {
        self.inner.caret()
    }

    pub fn mentions(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.inner.mentions()).map_err(to_js)
    }

    pub fn highlights(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.highlights()).map_err(to_js)
    }

    /// Popover view model, or null when closed
    #[wasm_bindgen(js_name = suggestionView)]
    pub fn suggestion_view(&self) -> Result<JsValue, JsValue> {
        match self.inner.suggestion_view() {
            Some(view) => serde_wasm_bindgen::to_value(&view).map_err(to_js),
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen(js_name = isSuggestionOpen)]
    pub fn is_suggestion_open(&self) -> bool {
        self.inner.session().is_open()
    }

    #[wasm_bindgen(js_name = isLoading)]
    pub fn is_loading(&self) -> bool {
        self.inner.store().is_loading()
    }
}

// =============================================================================
// Scanner-only entry points
// =============================================================================

/// Mentions in `text` against a metadata response, sorted by id
#[wasm_bindgen(js_name = extractMentions)]
pub fn extract_mentions_js(text: &str, metadata: JsValue) -> Result<JsValue, JsValue> {
    let index = index_from_metadata(metadata)?;
    serde_wasm_bindgen::to_value(&extract_mentions(text, &index)).map_err(to_js)
}

/// Token spans (including `{{...}}` fields) flagged with whether they resolve
#[wasm_bindgen(js_name = highlightTokens)]
pub fn highlight_tokens_js(text: &str, metadata: JsValue) -> Result<JsValue, JsValue> {
    let index = index_from_metadata(metadata)?;
    let spans = TokenCortex::new().highlight(text, &index);
    serde_wasm_bindgen::to_value(&spans).map_err(to_js)
}
