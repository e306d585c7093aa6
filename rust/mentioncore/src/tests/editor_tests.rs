//! End-to-end editor flows through EditorBinding

use super::fixtures::reference_data;
use crate::config::EditorConfig;
use crate::editor::{BindingState, EditorBinding, EditorEvent, SuggestionSession};
use crate::suggest::EmptyState;

fn editor(key: &str) -> EditorBinding {
    let mut editor = EditorBinding::new(EditorConfig::default(), SuggestionSession::new(key)).unwrap();
    editor.hydrate(reference_data()).unwrap();
    editor
}

fn mention_events(events: &[EditorEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, EditorEvent::MentionsChanged { .. }))
        .count()
}

// ============================================================================
// Token insertion round trip
// ============================================================================

#[test]
fn test_insert_model_collection_token() {
    let mut editor = editor("e1");
    editor.insert_text("map to ").unwrap();
    editor.insert_text("@").unwrap();
    editor.insert_text("orders").unwrap();

    let item = editor
        .suggestion_view()
        .unwrap()
        .groups
        .iter()
        .find(|g| g.key == "models")
        .and_then(|g| g.items.first().cloned())
        .unwrap();
    assert_eq!(item.collection_name.as_deref(), Some("orders"));

    let events = editor.choose(&item).unwrap();
    assert!(editor.text().contains("#orders "));
    assert_eq!(editor.text(), "map to #orders ");
    assert_eq!(mention_events(&events), 1);
    assert!(editor.mentions().iter().any(|m| m.id() == "orders"));
}

#[test]
fn test_typing_full_flow_emits_text_each_keystroke() {
    let mut editor = editor("e1");
    let mut texts = Vec::new();
    for chunk in ["a", "b", "@"] {
        for event in editor.insert_text(chunk).unwrap() {
            if let EditorEvent::TextChanged { text } = event {
                texts.push(text);
            }
        }
    }
    assert_eq!(texts, vec!["a", "ab", "ab@"]);
    assert_eq!(editor.state(), BindingState::SuggestionOpen);
}

// ============================================================================
// HTML round trip
// ============================================================================

#[test]
fn test_special_characters_survive_host_round_trip() {
    let original = "if a < b && c > d say \"hi\" & 'bye'\nnext <line>";
    let mut first = editor("e1");
    first.set_text(original).unwrap();
    assert_eq!(first.text(), original);

    let html = first.html();
    assert!(!html.contains("<line>"));

    let mut second = editor("e2");
    second.set_html(&html).unwrap();
    assert_eq!(second.text(), original);
}

// ============================================================================
// Host synchronisation
// ============================================================================

#[test]
fn test_echoed_text_does_not_reset_document() {
    let mut editor = editor("e1");
    editor.insert_text("one").unwrap();
    editor.insert_hard_break().unwrap();
    editor.insert_text("two").unwrap();
    let blocks_before = editor.document().blocks().len();

    // Host re-renders with the text it was just given
    let text = editor.text();
    assert!(editor.set_text(&text).unwrap().is_empty());
    assert_eq!(editor.document().blocks().len(), blocks_before);
    assert_eq!(editor.caret(), 7);
}

#[test]
fn test_external_replacement_reemits_mentions_once() {
    let mut editor = editor("e1");
    let events = editor.set_text("@fnA and #modelB").unwrap();
    assert_eq!(mention_events(&events), 1);
    assert_eq!(editor.mentions().len(), 2);

    // Same mentions in a different order: nothing new for the host
    let events = editor.set_text("#modelB and @fnA").unwrap();
    assert_eq!(mention_events(&events), 0);
}

#[test]
fn test_primed_channel_suppresses_mount_emission() {
    let mut editor = editor("e1");
    let persisted = crate::scanner::extract_mentions("@fnA", &super::fixtures::index());
    editor.prime_mentions(persisted).unwrap();
    let events = editor.set_text("@fnA").unwrap();
    assert_eq!(mention_events(&events), 0);
}

// ============================================================================
// Sessions
// ============================================================================

#[test]
fn test_two_editors_do_not_share_popover_state() {
    let mut left = editor("left");
    let mut right = editor("right");

    left.insert_text("@").unwrap();
    assert_eq!(left.state(), BindingState::SuggestionOpen);
    assert_eq!(right.state(), BindingState::Idle);

    right.insert_text("@").unwrap();
    left.dismiss_suggestion();
    assert_eq!(left.state(), BindingState::Idle);
    assert_eq!(right.state(), BindingState::SuggestionOpen);
    assert_eq!(right.session().key(), "right");
}

#[test]
fn test_popover_while_loading_then_hydrated() {
    let mut editor =
        EditorBinding::new(EditorConfig::default(), SuggestionSession::new("e1")).unwrap();
    editor.insert_text("@").unwrap();
    assert_eq!(editor.suggestion_view().unwrap().empty, EmptyState::Loading);

    let events = editor.hydrate(reference_data()).unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, EditorEvent::SuggestionUpdated { .. })));
    let view = editor.suggestion_view().unwrap();
    assert_eq!(view.empty, EmptyState::None);
    assert_eq!(view.groups.len(), 3);
}

#[test]
fn test_max_items_per_group() {
    let config = EditorConfig {
        max_items_per_group: Some(1),
        ..EditorConfig::default()
    };
    let mut editor = EditorBinding::new(config, SuggestionSession::new("e1")).unwrap();
    editor.hydrate(reference_data()).unwrap();
    editor.insert_text("@").unwrap();
    let view = editor.suggestion_view().unwrap();
    assert!(view.groups.iter().all(|g| g.items.len() == 1));
}
