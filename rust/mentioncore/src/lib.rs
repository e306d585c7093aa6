//! MentionCore: Instruction token scanner + mention editor engine
//!
//! A Rust/WASM core behind the mapping-instruction editor. The JS side owns
//! rendering; everything stateful lives here.
//!
//! # Architecture
//!
//! ## Reference data
//! - `reference/records.rs` - ApiRecord / FunctionRecord / ModelRecord, metadata envelope
//! - `reference/index.rs` - ReferenceIndex: lookup maps by key, id, name, collection
//! - `reference/store.rs` - ReferenceStore: fingerprinted rebuild, loading flag, fetch failure
//!
//! ## Scanner
//! - `scanner/syntax.rs` - TokenCortex: `@fn`, `#model`, `/api(ref)`, `{{field}}` patterns
//! - `scanner/extract.rs` - Mention extraction (resolve, dedup, sort)
//! - `scanner/emission.rs` - MentionChannel: notify only on a genuine change
//!
//! ## Suggestions
//! - `suggest/items.rs` - Catalog groups and query filtering
//! - `suggest/trigger.rs` - Query span detection behind the caret
//! - `suggest/popover.rs` - Placement, empty states, keyboard contract
//!
//! ## Editor
//! - `editor/document.rs` - Block/inline document, plain-text projection, HTML I/O
//! - `editor/session.rs` - Per-editor suggestion session
//! - `editor/binding.rs` - EditorBinding state machine
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { MentionEditor, extractMentions } from 'mentioncore';
//!
//! await init();
//!
//! const editor = new MentionEditor('mapping-42', { triggerChar: '@' });
//! editor.onTextChange((text) => setText(text));
//! editor.onMentionsChange((mentions) => setMentions(mentions));
//!
//! editor.hydrate(await fetchMetadata());   // { data: { apis, functions, models } }
//! editor.setText(initialText);
//!
//! editor.insertText('@');                  // opens the popover
//! const view = editor.suggestionView();    // groups, selection, empty state
//! if (editor.keyDown('Enter')) event.preventDefault();
//! ```

pub mod config;
pub mod console;
pub mod editor;
pub mod error;
pub mod reference;
pub mod scanner;
pub mod suggest;
pub mod text;
pub mod wasm;

#[cfg(test)]
mod tests;

pub use config::*;
pub use editor::*;
pub use error::MentionError;
pub use reference::*;
pub use scanner::*;
pub use suggest::*;
pub use wasm::*;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("mentioncore v{}", env!("CARGO_PKG_VERSION"))
}
