//! Suggestion popover: filtered groups, placement and keyboard contract
//!
//! Rendering stays in the JS view; this holds everything the view reads.
//! While open, the host must re-measure the trigger rect and call
//! `reposition` on window scroll and resize, listening in the capture phase
//! because the editor may live inside a scrollable ancestor.

use serde::{Deserialize, Serialize};

use super::items::{filter_groups, SuggestionGroup, SuggestionItem};
use crate::config::PopoverConfig;

// =============================================================================
// Geometry
// =============================================================================

/// Client rect of the trigger decoration
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Overlay position and width
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub top: f64,
    pub left: f64,
    pub width: f64,
}

/// Place the overlay below the anchor; width clamped to `[min_width, max_width]`
pub fn place(anchor: &Rect, config: &PopoverConfig) -> Placement {
    Placement {
        top: anchor.bottom() + config.offset,
        left: anchor.left,
        width: anchor.width.clamp(config.min_width, config.max_width),
    }
}

// =============================================================================
// Keyboard
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopoverKey {
    Escape,
    ArrowUp,
    ArrowDown,
    Enter,
    Tab,
    Other,
}

impl PopoverKey {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Escape" | "Esc" => PopoverKey::Escape,
            "ArrowUp" | "Up" => PopoverKey::ArrowUp,
            "ArrowDown" | "Down" => PopoverKey::ArrowDown,
            "Enter" => PopoverKey::Enter,
            "Tab" => PopoverKey::Tab,
            _ => PopoverKey::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome {
    /// Key belongs to the editor
    Ignored,
    /// Key consumed by the popover (navigation)
    Handled,
    /// Escape: consumed, popover must close without inserting
    Dismissed,
    /// Item chosen; caller inserts it and closes
    Chosen(SuggestionItem),
}

impl KeyOutcome {
    pub fn is_handled(&self) -> bool {
        !matches!(self, KeyOutcome::Ignored)
    }
}

// =============================================================================
// Controller
// =============================================================================

/// Mutually exclusive empty states
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum EmptyState {
    /// Items are listed
    None,
    /// Reference data not resolved yet: show "Loading…"
    Loading,
    /// Nothing matches: show "No results"
    NoResults,
}

impl EmptyState {
    pub fn label(&self) -> Option<&'static str> {
        match self {
            EmptyState::None => None,
            EmptyState::Loading => Some("Loading…"),
            EmptyState::NoResults => Some("No results"),
        }
    }
}

/// Serializable snapshot for the JS view
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PopoverView {
    pub query: String,
    pub groups: Vec<SuggestionGroup>,
    /// Flat index across all groups
    pub selected: usize,
    pub empty: EmptyState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
}

#[derive(Debug, Clone)]
pub struct PopoverController {
    config: PopoverConfig,
    query: String,
    groups: Vec<SuggestionGroup>,
    selected: usize,
    empty: EmptyState,
    placement: Option<Placement>,
}

impl PopoverController {
    pub fn new(config: PopoverConfig) -> Self {
        Self {
            config,
            query: String::new(),
            groups: Vec::new(),
            selected: 0,
            empty: EmptyState::NoResults,
            placement: None,
        }
    }

    /// Re-filter for a query. The selection resets when the query changes.
    pub fn refresh(
        &mut self,
        catalog: &[SuggestionGroup],
        query: &str,
        loading: bool,
        max_per_group: Option<usize>,
    ) {
        if query != self.query {
            self.selected = 0;
        }
        self.query = query.to_string();
        self.groups = filter_groups(catalog, query, max_per_group);

        let count = self.item_count();
        if self.selected >= count {
            self.selected = 0;
        }
        self.empty = match (count, loading) {
            (0, true) => EmptyState::Loading,
            (0, false) => EmptyState::NoResults,
            _ => EmptyState::None,
        };
    }

    pub fn reposition(&mut self, anchor: &Rect) -> Placement {
        let placement = place(anchor, &self.config);
        self.placement = Some(placement);
        placement
    }

    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    pub fn groups(&self) -> &[SuggestionGroup] {
        &self.groups
    }

    pub fn empty_state(&self) -> EmptyState {
        self.empty
    }

    pub fn item_count(&self) -> usize {
        self.groups.iter().map(|g| g.items.len()).sum()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&SuggestionItem> {
        self.groups.iter().flat_map(|g| g.items.iter()).nth(self.selected)
    }

    pub fn handle_key(&mut self, key: PopoverKey) -> KeyOutcome {
        let count = self.item_count();
        match key {
            PopoverKey::Escape => KeyOutcome::Dismissed,
            PopoverKey::ArrowDown if count > 0 => {
                self.selected = (self.selected + 1) % count;
                KeyOutcome::Handled
            }
            PopoverKey::ArrowUp if count > 0 => {
                self.selected = (self.selected + count - 1) % count;
                KeyOutcome::Handled
            }
            PopoverKey::Enter | PopoverKey::Tab => match self.selected_item() {
                Some(item) => KeyOutcome::Chosen(item.clone()),
                None => KeyOutcome::Ignored,
            },
            _ => KeyOutcome::Ignored,
        }
    }

    pub fn view(&self) -> PopoverView {
        PopoverView {
            query: self.query.clone(),
            groups: self.groups.clone(),
            selected: self.selected,
            empty: self.empty,
            empty_label: self.empty.label().map(str::to_string),
            placement: self.placement,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceKind;

    fn item(name: &str, kind: ReferenceKind) -> SuggestionItem {
        SuggestionItem {
            id: Some(name.to_string()),
            key: None,
            name: name.to_string(),
            description: None,
            kind,
            collection_name: None,
        }
    }

    fn catalog() -> Vec<SuggestionGroup> {
        vec![
            SuggestionGroup {
                key: "functions".into(),
                title: "Functions".into(),
                items: vec![item("alpha", ReferenceKind::Function), item("beta", ReferenceKind::Function)],
            },
            SuggestionGroup {
                key: "models".into(),
                title: "Models".into(),
                items: vec![item("orders", ReferenceKind::Model)],
            },
        ]
    }

    // -------------------------------------------------------------------------
    // Requirement 1: Placement below anchor with clamped width
    // -------------------------------------------------------------------------
    #[test]
    fn test_placement() {
        let config = PopoverConfig::default();
        let anchor = Rect { top: 100.0, left: 40.0, width: 12.0, height: 20.0 };
        let p = place(&anchor, &config);
        assert_eq!(p.top, 128.0);
        assert_eq!(p.left, 40.0);
        assert_eq!(p.width, 280.0);

        let wide = Rect { width: 900.0, ..anchor };
        assert_eq!(place(&wide, &config).width, 420.0);

        let mid = Rect { width: 300.0, ..anchor };
        assert_eq!(place(&mid, &config).width, 300.0);
    }

    // -------------------------------------------------------------------------
    // Requirement 2: Loading and No results are mutually exclusive
    // -------------------------------------------------------------------------
    #[test]
    fn test_empty_states() {
        let mut popover = PopoverController::new(PopoverConfig::default());

        popover.refresh(&[], "", true, None);
        assert_eq!(popover.empty_state(), EmptyState::Loading);
        assert_eq!(popover.view().empty_label.as_deref(), Some("Loading…"));

        popover.refresh(&[], "", false, None);
        assert_eq!(popover.empty_state(), EmptyState::NoResults);

        // Stale data while loading still lists items
        popover.refresh(&catalog(), "", true, None);
        assert_eq!(popover.empty_state(), EmptyState::None);
        assert!(popover.view().empty_label.is_none());
    }

    // -------------------------------------------------------------------------
    // Requirement 3: Escape is consumed and dismisses
    // -------------------------------------------------------------------------
    #[test]
    fn test_escape_dismisses() {
        let mut popover = PopoverController::new(PopoverConfig::default());
        popover.refresh(&catalog(), "", false, None);
        let outcome = popover.handle_key(PopoverKey::from_dom("Escape"));
        assert_eq!(outcome, KeyOutcome::Dismissed);
        assert!(outcome.is_handled());
    }

    // -------------------------------------------------------------------------
    // Requirement 4: Arrow navigation wraps across groups
    // -------------------------------------------------------------------------
    #[test]
    fn test_arrow_navigation() {
        let mut popover = PopoverController::new(PopoverConfig::default());
        popover.refresh(&catalog(), "", false, None);

        assert_eq!(popover.handle_key(PopoverKey::ArrowDown), KeyOutcome::Handled);
        assert_eq!(popover.handle_key(PopoverKey::ArrowDown), KeyOutcome::Handled);
        assert_eq!(popover.selected_item().unwrap().name, "orders");
        popover.handle_key(PopoverKey::ArrowDown);
        assert_eq!(popover.selected_item().unwrap().name, "alpha");
        popover.handle_key(PopoverKey::ArrowUp);
        assert_eq!(popover.selected_item().unwrap().name, "orders");
    }

    // -------------------------------------------------------------------------
    // Requirement 5: Enter chooses the highlighted item
    // -------------------------------------------------------------------------
    #[test]
    fn test_enter_chooses() {
        let mut popover = PopoverController::new(PopoverConfig::default());
        popover.refresh(&catalog(), "bet", false, None);
        match popover.handle_key(PopoverKey::Enter) {
            KeyOutcome::Chosen(item) => assert_eq!(item.name, "beta"),
            other => panic!("expected Chosen, got {:?}", other),
        }
    }

    #[test]
    fn test_enter_with_no_items_falls_through() {
        let mut popover = PopoverController::new(PopoverConfig::default());
        popover.refresh(&catalog(), "zzz", false, None);
        assert_eq!(popover.handle_key(PopoverKey::Enter), KeyOutcome::Ignored);
        assert_eq!(popover.handle_key(PopoverKey::ArrowDown), KeyOutcome::Ignored);
    }

    #[test]
    fn test_query_change_resets_selection() {
        let mut popover = PopoverController::new(PopoverConfig::default());
        popover.refresh(&catalog(), "", false, None);
        popover.handle_key(PopoverKey::ArrowDown);
        assert_eq!(popover.selected_index(), 1);
        popover.refresh(&catalog(), "a", false, None);
        assert_eq!(popover.selected_index(), 0);
    }

    #[test]
    fn test_other_keys_ignored() {
        let mut popover = PopoverController::new(PopoverConfig::default());
        popover.refresh(&catalog(), "", false, None);
        assert_eq!(popover.handle_key(PopoverKey::from_dom("a")), KeyOutcome::Ignored);
    }
}
