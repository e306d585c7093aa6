//! ReferenceStore: memoised index + catalog with loading state
//!
//! Rebuilds are keyed on a content fingerprint of the three lists, so a host
//! that re-delivers the same metadata on every render pays only for a hash.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::index::ReferenceIndex;
use super::records::ReferenceData;
use crate::suggest::{build_catalog, SuggestionGroup};

/// Outcome of a hydrate call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HydrateResult {
    /// False when the fingerprint matched and the rebuild was skipped
    pub rebuilt: bool,
    /// Fingerprint as hex string (u64 would overflow JS Number.MAX_SAFE_INTEGER)
    pub fingerprint: String,
    pub record_count: usize,
}

#[derive(Debug, Clone)]
pub struct ReferenceStore {
    index: ReferenceIndex,
    catalog: Vec<SuggestionGroup>,
    fingerprint: Option<u64>,
    loading: bool,
    failure: Option<String>,
    rebuild_count: u64,
    skip_count: u64,
}

impl Default for ReferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceStore {
    /// Fresh store: empty index, loading until the first hydrate
    pub fn new() -> Self {
        let index = ReferenceIndex::new();
        let catalog = build_catalog(&index);
        Self {
            index,
            catalog,
            fingerprint: None,
            loading: true,
            failure: None,
            rebuild_count: 0,
            skip_count: 0,
        }
    }

    fn compute_fingerprint(data: &ReferenceData) -> u64 {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        hasher.finish()
    }

    /// Install freshly fetched reference data
    pub fn hydrate(&mut self, data: ReferenceData) -> HydrateResult {
        let fingerprint = Self::compute_fingerprint(&data);
        let record_count = data.record_count();
        self.loading = false;
        self.failure = None;

        if self.fingerprint == Some(fingerprint) {
            self.skip_count += 1;
            return HydrateResult {
                rebuilt: false,
                fingerprint: format!("{:x}", fingerprint),
                record_count,
            };
        }

        self.index = ReferenceIndex::build(data);
        self.catalog = build_catalog(&self.index);
        self.fingerprint = Some(fingerprint);
        self.rebuild_count += 1;

        HydrateResult {
            rebuilt: true,
            fingerprint: format!("{:x}", fingerprint),
            record_count,
        }
    }

    /// The metadata fetch failed. The last hydrated snapshot stays in use;
    /// a store that was never hydrated stays empty.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.loading = false;
        self.failure = Some(reason.into());
    }

    pub fn is_hydrated(&self) -> bool {
        self.fingerprint.is_some()
    }

    /// A refetch started (cache invalidation). The current index stays usable.
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn index(&self) -> &ReferenceIndex {
        &self.index
    }

    pub fn catalog(&self) -> &[SuggestionGroup] {
        &self.catalog
    }

    pub fn rebuild_count(&self) -> u64 {
        self.rebuild_count
    }

    pub fn skip_count(&self) -> u64 {
        self.skip_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{ApiRecord, FunctionRecord};

    fn data(fn_name: &str) -> ReferenceData {
        ReferenceData {
            apis: vec![ApiRecord { id: Some("a1".into()), name: "Get Orders".into(), key: None }],
            functions: vec![FunctionRecord { id: "f1".into(), name: fn_name.into(), ..Default::default() }],
            models: vec![],
        }
    }

    // -------------------------------------------------------------------------
    // Requirement 1: New store is loading with an empty index
    // -------------------------------------------------------------------------
    #[test]
    fn test_new_store_is_loading() {
        let store = ReferenceStore::new();
        assert!(store.is_loading());
        assert!(store.index().is_empty());
        assert!(store.catalog().iter().all(|g| g.items.is_empty()));
    }

    // -------------------------------------------------------------------------
    // Requirement 2: Hydrate builds index and catalog, clears loading
    // -------------------------------------------------------------------------
    #[test]
    fn test_hydrate_builds() {
        let mut store = ReferenceStore::new();
        let result = store.hydrate(data("calc"));
        assert!(result.rebuilt);
        assert_eq!(result.record_count, 2);
        assert!(!store.is_loading());
        assert!(store.index().resolve_function("calc").is_some());
        assert_eq!(store.catalog()[0].items.len(), 1);
    }

    // -------------------------------------------------------------------------
    // Requirement 3: Identical content skips the rebuild
    // -------------------------------------------------------------------------
    #[test]
    fn test_identical_content_skips_rebuild() {
        let mut store = ReferenceStore::new();
        let first = store.hydrate(data("calc"));
        let second = store.hydrate(data("calc"));
        assert!(!second.rebuilt);
        assert_eq!(first.fingerprint, second.fingerprint);
        assert_eq!(store.rebuild_count(), 1);
        assert_eq!(store.skip_count(), 1);
    }

    // -------------------------------------------------------------------------
    // Requirement 4: Changed content rebuilds
    // -------------------------------------------------------------------------
    #[test]
    fn test_changed_content_rebuilds() {
        let mut store = ReferenceStore::new();
        store.hydrate(data("calc"));
        let result = store.hydrate(data("format"));
        assert!(result.rebuilt);
        assert!(store.index().resolve_function("calc").is_none());
        assert!(store.index().resolve_function("format").is_some());
    }

    // -------------------------------------------------------------------------
    // Requirement 5: Failure ends loading and keeps the last snapshot
    // -------------------------------------------------------------------------
    #[test]
    fn test_failure_before_hydrate_is_empty() {
        let mut store = ReferenceStore::new();
        store.fail("network unreachable");
        assert!(!store.is_loading());
        assert!(!store.is_hydrated());
        assert!(store.index().is_empty());
        assert_eq!(store.failure(), Some("network unreachable"));
    }

    #[test]
    fn test_failed_refetch_keeps_snapshot() {
        let mut store = ReferenceStore::new();
        store.hydrate(data("calc"));
        store.set_loading(true);
        store.fail("timeout");
        assert!(!store.is_loading());
        assert_eq!(store.failure(), Some("timeout"));
        assert!(store.index().resolve_function("calc").is_some());
        assert_eq!(store.catalog()[0].items.len(), 1);

        // Recovery with the same content clears the failure without a rebuild
        let result = store.hydrate(data("calc"));
        assert!(!result.rebuilt);
        assert!(store.failure().is_none());
    }

    #[test]
    fn test_refetch_keeps_stale_index() {
        let mut store = ReferenceStore::new();
        store.hydrate(data("calc"));
        store.set_loading(true);
        assert!(store.is_loading());
        assert!(store.index().resolve_function("calc").is_some());
    }
}
