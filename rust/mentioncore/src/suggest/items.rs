//! Suggestion catalog: view projections of the reference index
//!
//! The catalog is rebuilt wholesale whenever reference data changes.
//! Filtering returns fresh groups and never touches the catalog.

use serde::{Deserialize, Serialize};

use crate::reference::{ApiRecord, FunctionRecord, ModelRecord, ReferenceIndex, ReferenceKind};

/// One selectable entry in the popover
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub kind: ReferenceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
}

/// One popover section per reference kind
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SuggestionGroup {
    pub key: String,
    pub title: String,
    pub items: Vec<SuggestionItem>,
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

impl SuggestionItem {
    pub fn from_function(function: &FunctionRecord, index: &ReferenceIndex) -> Self {
        let description = function
            .api_id
            .as_deref()
            .and_then(|api_id| index.api_by_id(api_id))
            .map(|api| format!("via {}", api.name));
        Self {
            id: non_empty(&function.id),
            key: function.key.clone(),
            name: function.name.clone(),
            description,
            kind: ReferenceKind::Function,
            collection_name: None,
        }
    }

    pub fn from_model(model: &ModelRecord) -> Self {
        let mut parts: Vec<String> = Vec::new();
        if model.is_view == Some(true) {
            parts.push("view".to_string());
        } else if let Some(kind) = model.model_type.as_deref().filter(|t| !t.is_empty()) {
            parts.push(kind.to_string());
        }
        if let Some(count) = model.estimated_count {
            parts.push(format!("~{} documents", count));
        }
        Self {
            id: Some(model.identity().to_string()),
            key: None,
            name: model.name.clone(),
            description: if parts.is_empty() { None } else { Some(parts.join(" · ")) },
            kind: ReferenceKind::Model,
            collection_name: model.collection_name.clone(),
        }
    }

    pub fn from_api(api: &ApiRecord) -> Self {
        Self {
            id: api.id.clone(),
            key: api.key.clone(),
            name: api.name.clone(),
            description: api.key.as_deref().map(|k| format!("/api({})", k)),
            kind: ReferenceKind::Api,
            collection_name: None,
        }
    }

    /// Case-insensitive substring match on name, description or collection name.
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        let hit = |field: &str| field.to_lowercase().contains(needle);
        hit(&self.name)
            || self.description.as_deref().map_or(false, hit)
            || self.collection_name.as_deref().map_or(false, hit)
    }
}

/// Build the full, unfiltered catalog: functions, models, then APIs
pub fn build_catalog(index: &ReferenceIndex) -> Vec<SuggestionGroup> {
    vec![
        SuggestionGroup {
            key: ReferenceKind::Function.mention_type().to_string(),
            title: "Functions".to_string(),
            items: index
                .functions()
                .iter()
                .map(|f| SuggestionItem::from_function(f, index))
                .collect(),
        },
        SuggestionGroup {
            key: ReferenceKind::Model.mention_type().to_string(),
            title: "Models".to_string(),
            items: index.models().iter().map(SuggestionItem::from_model).collect(),
        },
        SuggestionGroup {
            key: ReferenceKind::Api.mention_type().to_string(),
            title: "APIs".to_string(),
            items: index.apis().iter().map(SuggestionItem::from_api).collect(),
        },
    ]
}

/// Filter the catalog by query. Groups left empty are dropped.
pub fn filter_groups(
    catalog: &[SuggestionGroup],
    query: &str,
    max_per_group: Option<usize>,
) -> Vec<SuggestionGroup> {
    let needle = query.trim().to_lowercase();
    catalog
        .iter()
        .filter_map(|group| {
            let items: Vec<SuggestionItem> = group
                .items
                .iter()
                .filter(|item| item.matches(&needle))
                .take(max_per_group.unwrap_or(usize::MAX))
                .cloned()
                .collect();
            if items.is_empty() {
                None
            } else {
                Some(SuggestionGroup {
                    key: group.key.clone(),
                    title: group.title.clone(),
                    items,
                })
            }
        })
        .collect()
}
