//! Mention extraction: tokens resolved against the reference index
//!
//! Passes run functions, then models, then APIs, each left to right.
//! A token that does not resolve stays plain text and yields no mention.
//! Within a kind the first occurrence of an identity wins.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::syntax::TokenCortex;
use crate::reference::{ApiRecord, FunctionRecord, ModelRecord, ReferenceIndex, ReferenceKind};

// =============================================================================
// Types
// =============================================================================

/// A structured reference recovered from a token.
///
/// Serializes as `{ "mention_type": "apis", "id", "name", "data" }`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "mention_type", rename_all = "lowercase")]
pub enum Mention {
    Functions {
        id: String,
        name: String,
        data: FunctionRecord,
    },
    Models {
        id: String,
        name: String,
        data: ModelRecord,
    },
    Apis {
        id: String,
        name: String,
        data: ApiRecord,
    },
}

impl Mention {
    pub fn id(&self) -> &str {
        match self {
            Mention::Functions { id, .. } | Mention::Models { id, .. } | Mention::Apis { id, .. } => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Mention::Functions { name, .. }
            | Mention::Models { name, .. }
            | Mention::Apis { name, .. } => name,
        }
    }

    pub fn kind(&self) -> ReferenceKind {
        match self {
            Mention::Functions { .. } => ReferenceKind::Function,
            Mention::Models { .. } => ReferenceKind::Model,
            Mention::Apis { .. } => ReferenceKind::Api,
        }
    }

    pub fn mention_type(&self) -> &'static str {
        self.kind().mention_type()
    }

    fn from_function(function: &FunctionRecord) -> Self {
        Mention::Functions {
            id: function.identity().to_string(),
            name: function.name.clone(),
            data: function.clone(),
        }
    }

    fn from_model(model: &ModelRecord) -> Self {
        let id = model.identity().to_string();
        Mention::Models {
            name: id.clone(),
            id,
            data: model.clone(),
        }
    }

    fn from_api(api: &ApiRecord) -> Self {
        Mention::Apis {
            id: api.identity().to_string(),
            name: api.name.clone(),
            data: api.clone(),
        }
    }
}

/// Sort by id; ties between kinds fall back to kind order so the result is
/// independent of token order in the text.
pub fn sort_mentions(mentions: &mut [Mention]) {
    mentions.sort_by(|a, b| a.id().cmp(b.id()).then_with(|| a.kind().cmp(&b.kind())));
}

/// Extraction statistics
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ScanStats {
    pub total_us: u64,
    /// Function, model and API tokens found (resolved or not)
    pub tokens_seen: usize,
    /// Tokens with no matching reference record
    pub unresolved: usize,
    /// Tokens dropped because their identity was already collected
    pub duplicates: usize,
}

/// Extraction result in scan order
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MentionScan {
    pub mentions: Vec<Mention>,
    pub stats: ScanStats,
}

// =============================================================================
// Extraction
// =============================================================================

impl TokenCortex {
    /// Recover mentions from text, in scan order (functions, models, APIs)
    pub fn extract(&self, text: &str, index: &ReferenceIndex) -> MentionScan {
        let start = instant::Instant::now();
        let mut scan = MentionScan::default();
        let mut seen: HashSet<(ReferenceKind, String)> = HashSet::new();

        let mut accept = |scan: &mut MentionScan, mention: Option<Mention>| {
            scan.stats.tokens_seen += 1;
            match mention {
                None => scan.stats.unresolved += 1,
                Some(mention) => {
                    if seen.insert((mention.kind(), mention.id().to_string())) {
                        scan.mentions.push(mention);
                    } else {
                        scan.stats.duplicates += 1;
                    }
                }
            }
        };

        // 1. @function
        for token in self.functions(text) {
            let mention = index.resolve_function(&token.key).map(Mention::from_function);
            accept(&mut scan, mention);
        }

        // 2. #model (collection name, then model name)
        for token in self.models(text) {
            let mention = index.resolve_model(&token.key).map(Mention::from_model);
            accept(&mut scan, mention);
        }

        // 3. /api(ref) (key, id, then name; inner text trimmed)
        for token in self.apis(text) {
            let mention = index.resolve_api(&token.key).map(Mention::from_api);
            accept(&mut scan, mention);
        }

        scan.stats.total_us = start.elapsed().as_micros() as u64;
        scan
    }
}

/// Convenience: extract and sort by id in one call
pub fn extract_mentions(text: &str, index: &ReferenceIndex) -> Vec<Mention> {
    let mut mentions = TokenCortex::new().extract(text, index).mentions;
    sort_mentions(&mut mentions);
    mentions
}

// =============================================================================
// Tests
// =============================================================================
