//! ReferenceIndex: O(1) token resolution over the reference lists
//!
//! Built in a single pass over each list. Maps hold positions into the owned
//! record vectors, so a rebuild is a pure function of the input lists.
//! Duplicate names resolve to the record seen last.

use std::collections::HashMap;

use super::records::{ApiRecord, FunctionRecord, ModelRecord, ReferenceData};

#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    data: ReferenceData,

    api_by_key: HashMap<String, usize>,
    api_by_id: HashMap<String, usize>,
    api_by_name: HashMap<String, usize>,

    function_by_name: HashMap<String, usize>,
    function_by_id: HashMap<String, usize>,

    model_by_collection: HashMap<String, usize>,
    model_by_name: HashMap<String, usize>,
}

fn insert_key(map: &mut HashMap<String, usize>, key: Option<&str>, pos: usize) {
    if let Some(key) = key.filter(|k| !k.is_empty()) {
        map.insert(key.to_string(), pos);
    }
}

impl ReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(data: ReferenceData) -> Self {
        let mut index = ReferenceIndex::default();

        for (pos, api) in data.apis.iter().enumerate() {
            insert_key(&mut index.api_by_key, api.key.as_deref(), pos);
            insert_key(&mut index.api_by_id, api.id.as_deref(), pos);
            insert_key(&mut index.api_by_name, Some(&api.name), pos);
        }

        for (pos, function) in data.functions.iter().enumerate() {
            insert_key(&mut index.function_by_name, Some(&function.name), pos);
            insert_key(&mut index.function_by_id, Some(&function.id), pos);
        }

        for (pos, model) in data.models.iter().enumerate() {
            insert_key(&mut index.model_by_collection, model.collection_name.as_deref(), pos);
            insert_key(&mut index.model_by_name, Some(&model.name), pos);
        }

        index.data = data;
        index
    }

    pub fn data(&self) -> &ReferenceData {
        &self.data
    }

    pub fn apis(&self) -> &[ApiRecord] {
        &self.data.apis
    }

    pub fn functions(&self) -> &[FunctionRecord] {
        &self.data.functions
    }

    pub fn models(&self) -> &[ModelRecord] {
        &self.data.models
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // -------------------------------------------------------------------------
    // Single-map lookups
    // -------------------------------------------------------------------------

    pub fn api_by_key(&self, key: &str) -> Option<&ApiRecord> {
        self.api_by_key.get(key).map(|&i| &self.data.apis[i])
    }

    pub fn api_by_id(&self, id: &str) -> Option<&ApiRecord> {
        self.api_by_id.get(id).map(|&i| &self.data.apis[i])
    }

    pub fn api_by_name(&self, name: &str) -> Option<&ApiRecord> {
        self.api_by_name.get(name).map(|&i| &self.data.apis[i])
    }

    pub fn function_by_name(&self, name: &str) -> Option<&FunctionRecord> {
        self.function_by_name.get(name).map(|&i| &self.data.functions[i])
    }

    pub fn function_by_id(&self, id: &str) -> Option<&FunctionRecord> {
        self.function_by_id.get(id).map(|&i| &self.data.functions[i])
    }

    pub fn model_by_collection(&self, collection: &str) -> Option<&ModelRecord> {
        self.model_by_collection.get(collection).map(|&i| &self.data.models[i])
    }

    pub fn model_by_name(&self, name: &str) -> Option<&ModelRecord> {
        self.model_by_name.get(name).map(|&i| &self.data.models[i])
    }

    // -------------------------------------------------------------------------
    // Token resolution
    // -------------------------------------------------------------------------

    /// Resolve the name captured from an `@name` token
    pub fn resolve_function(&self, name: &str) -> Option<&FunctionRecord> {
        self.function_by_name(name)
    }

    /// Resolve the name captured from a `#name` token: collection first, then model name
    pub fn resolve_model(&self, name: &str) -> Option<&ModelRecord> {
        self.model_by_collection(name)
            .or_else(|| self.model_by_name(name))
    }

    /// Resolve the (trimmed) inner text of an `/api(...)` token: key, id, then name
    pub fn resolve_api(&self, reference: &str) -> Option<&ApiRecord> {
        let reference = reference.trim();
        if reference.is_empty() {
            return None;
        }
        self.api_by_key(reference)
            .or_else(|| self.api_by_id(reference))
            .or_else(|| self.api_by_name(reference))
    }
}
