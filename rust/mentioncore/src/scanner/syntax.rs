//! TokenCortex - Instruction token detection via Regex
//!
//! Detects the reference tokens users type into mapping instructions:
//! - Functions: @calculateAge
//! - Models: #orders
//! - APIs: /api(get_orders)
//! - Fields: {{model.Order.total}}, {{input.x}}, {{output.y}} (highlight only)
//!
//! Also renders the canonical token text for a chosen suggestion.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::reference::{ReferenceIndex, ReferenceKind};
use crate::suggest::SuggestionItem;
use crate::text::char_offset;

// ==================== TYPE DEFINITIONS ====================

/// Kind of token detected
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Function,
    Model,
    Api,
    Field,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Function => "function",
            TokenKind::Model => "model",
            TokenKind::Api => "api",
            TokenKind::Field => "field",
        }
    }
}

/// A single token occurrence. `start`/`end` are char positions.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TokenMatch {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    /// Full token text, e.g. `/api(get_orders)`
    pub content: String,
    /// Captured reference, e.g. `get_orders` (untrimmed for APIs)
    pub key: String,
}

/// Token span for the highlighting layer
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HighlightSpan {
    #[serde(flatten)]
    pub token: TokenMatch,
    /// Whether the token resolves against the current reference index
    pub resolved: bool,
}

// ==================== MAIN IMPLEMENTATION ====================

/// TokenCortex - instruction token detector
///
/// One regex per token kind, compiled once per instance.
#[derive(Debug, Clone)]
pub struct TokenCortex {
    function_re: Regex,
    model_re: Regex,
    api_re: Regex,
    field_re: Regex,
}

impl Default for TokenCortex {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCortex {
    pub fn new() -> Self {
        // @name - ASCII word chars only
        let function_re = Regex::new(r"@([A-Za-z0-9_]+)").expect("function token pattern");

        // #name
        let model_re = Regex::new(r"#([A-Za-z0-9_]+)").expect("model token pattern");

        // /api(anything but a closing paren)
        let api_re = Regex::new(r"/api\(([^)]+)\)").expect("api token pattern");

        // {{model.Order.total}} - Group 1: namespace, Group 2: dotted path
        let field_re = Regex::new(r"\{\{(model|input|output)\.([^{}\s]+?)\}\}")
            .expect("field token pattern");

        Self {
            function_re,
            model_re,
            api_re,
            field_re,
        }
    }

    fn collect(re: &Regex, kind: TokenKind, text: &str) -> Vec<TokenMatch> {
        re.captures_iter(text)
            .filter_map(|cap| {
                let full = cap.get(0)?;
                let key = cap.get(1)?;
                Some(TokenMatch {
                    kind,
                    start: char_offset(text, full.start()),
                    end: char_offset(text, full.end()),
                    content: full.as_str().to_string(),
                    key: key.as_str().to_string(),
                })
            })
            .collect()
    }

    /// `@name` tokens, left to right
    pub fn functions(&self, text: &str) -> Vec<TokenMatch> {
        Self::collect(&self.function_re, TokenKind::Function, text)
    }

    /// `#name` tokens, left to right
    pub fn models(&self, text: &str) -> Vec<TokenMatch> {
        Self::collect(&self.model_re, TokenKind::Model, text)
    }

    /// `/api(...)` tokens, left to right
    pub fn apis(&self, text: &str) -> Vec<TokenMatch> {
        Self::collect(&self.api_re, TokenKind::Api, text)
    }

    /// `{{model|input|output.path}}` tokens. Key is `namespace.path`.
    pub fn fields(&self, text: &str) -> Vec<TokenMatch> {
        self.field_re
            .captures_iter(text)
            .filter_map(|cap| {
                let full = cap.get(0)?;
                let namespace = cap.get(1)?;
                let path = cap.get(2)?;
                Some(TokenMatch {
                    kind: TokenKind::Field,
                    start: char_offset(text, full.start()),
                    end: char_offset(text, full.end()),
                    content: full.as_str().to_string(),
                    key: format!("{}.{}", namespace.as_str(), path.as_str()),
                })
            })
            .collect()
    }

    /// Every token of every kind, sorted by position
    pub fn scan(&self, text: &str) -> Vec<TokenMatch> {
        let mut matches = self.functions(text);
        matches.extend(self.models(text));
        matches.extend(self.apis(text));
        matches.extend(self.fields(text));
        matches.sort_by_key(|m| m.start);
        matches
    }

    /// Token spans flagged with whether they resolve.
    ///
    /// `{{model.X...}}` resolves when `X` is a known model; `input`/`output`
    /// fields always resolve.
    pub fn highlight(&self, text: &str, index: &ReferenceIndex) -> Vec<HighlightSpan> {
        self.scan(text)
            .into_iter()
            .map(|token| {
                let resolved = match token.kind {
                    TokenKind::Function => index.resolve_function(&token.key).is_some(),
                    TokenKind::Model => index.resolve_model(&token.key).is_some(),
                    TokenKind::Api => index.resolve_api(&token.key).is_some(),
                    TokenKind::Field => match token.key.split_once('.') {
                        Some(("model", path)) => {
                            let model = path.split('.').next().unwrap_or(path);
                            index.resolve_model(model).is_some()
                        }
                        _ => true,
                    },
                };
                HighlightSpan { token, resolved }
            })
            .collect()
    }

    /// Canonical token text for a suggestion (no trailing space)
    pub fn canonical(item: &SuggestionItem) -> String {
        match item.kind {
            ReferenceKind::Function => format!("@{}", item.name),
            ReferenceKind::Model => {
                let name = item
                    .collection_name
                    .as_deref()
                    .filter(|c| !c.is_empty())
                    .unwrap_or(&item.name);
                format!("#{}", name)
            }
            ReferenceKind::Api => {
                let reference = item
                    .key
                    .as_deref()
                    .filter(|k| !k.is_empty())
                    .or_else(|| item.id.as_deref().filter(|i| !i.is_empty()))
                    .unwrap_or(&item.name);
                format!("/api({})", reference)
            }
        }
    }
}

// ==================== TESTS ====================
