//! Reference records served by the metadata endpoint
//!
//! Every field is defaulted and each list is read record by record, so a
//! single malformed record is dropped instead of rejecting the whole payload.
//! Records missing a lookup key are simply left out of the corresponding
//! index map.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::MentionError;

// =============================================================================
// Kinds
// =============================================================================

/// Origin kind of a reference record
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Function,
    Model,
    Api,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Function => "function",
            ReferenceKind::Model => "model",
            ReferenceKind::Api => "api",
        }
    }

    /// Plural tag used as `mention_type`
    pub fn mention_type(&self) -> &'static str {
        match self {
            ReferenceKind::Function => "functions",
            ReferenceKind::Model => "models",
            ReferenceKind::Api => "apis",
        }
    }
}

// =============================================================================
// Records
// =============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiRecord {
    #[serde(alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl ApiRecord {
    /// Canonical identity: `id`, then `key`, then `name`.
    ///
    /// Used by both the extractor and the suggestion catalog so one API never
    /// carries two identities.
    pub fn identity(&self) -> &str {
        self.id
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.key.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or(&self.name)
    }

    /// Text placed between the parens of an `/api(...)` token
    pub fn token_ref(&self) -> &str {
        self.key
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.id.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or(&self.name)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase", default)]
pub struct FunctionRecord {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl FunctionRecord {
    /// Identity: `id`, then `key`, then `name`
    pub fn identity(&self) -> &str {
        if !self.id.is_empty() {
            return &self.id;
        }
        self.key
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.name)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelRecord {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_view: Option<bool>,
    #[serde(deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub estimated_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_kind: Option<String>,
}

impl ModelRecord {
    /// Identity: `collectionName`, then `name`
    pub fn identity(&self) -> &str {
        self.collection_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.name)
    }
}

// =============================================================================
// Metadata Envelope
// =============================================================================

/// The three reference lists
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct ReferenceData {
    #[serde(deserialize_with = "lenient_list")]
    pub apis: Vec<ApiRecord>,
    #[serde(deserialize_with = "lenient_list")]
    pub functions: Vec<FunctionRecord>,
    #[serde(deserialize_with = "lenient_list")]
    pub models: Vec<ModelRecord>,
}

impl ReferenceData {
    pub fn is_empty(&self) -> bool {
        self.apis.is_empty() && self.functions.is_empty() && self.models.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.apis.len() + self.functions.len() + self.models.len()
    }
}

/// Keeps the records that parse; a non-array list reads as empty
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Counts are informational: fractional values truncate, anything else is dropped
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| {
        v.as_u64().or_else(|| {
            v.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f as u64)
        })
    }))
}

/// `{ data: { apis, functions, models } }` as returned by the metadata endpoint
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct MetadataResponse {
    pub data: ReferenceData,
}

impl MetadataResponse {
    pub fn from_json(json: &str) -> Result<Self, MentionError> {
        serde_json::from_str(json).map_err(|e| MentionError::MetadataParse(e.to_string()))
    }
}
