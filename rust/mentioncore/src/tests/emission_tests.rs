//! Extraction + emission properties
//!
//! Each test covers one observable guarantee of the scanner/channel pair.

use super::fixtures::index;
use crate::scanner::{extract_mentions, Mention, MentionChannel, TokenCortex};

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn test_unchanged_text_emits_once() {
    let index = index();
    let cortex = TokenCortex::new();
    let mut channel = MentionChannel::new();
    let text = "run @fnA on #modelB";

    let first = channel.offer(cortex.extract(text, &index).mentions).unwrap();
    assert_eq!(first.map(|m| m.len()), Some(2));

    let second = channel.offer(cortex.extract(text, &index).mentions).unwrap();
    assert!(second.is_none());
    assert_eq!(channel.stats().emitted, 1);
    assert_eq!(channel.stats().suppressed, 1);
}

// ============================================================================
// Sort invariance
// ============================================================================

#[test]
fn test_token_order_does_not_change_serialization() {
    let index = index();
    let a = extract_mentions("@fnA #modelB /api(keyC)", &index);
    let b = extract_mentions("#modelB /api(keyC) @fnA", &index);
    assert_eq!(a.len(), 3);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );

    let ids: Vec<&str> = a.iter().map(Mention::id).collect();
    assert_eq!(ids, vec!["c1", "f1", "modelB"]);
}

#[test]
fn test_reordered_text_does_not_refire() {
    let index = index();
    let cortex = TokenCortex::new();
    let mut channel = MentionChannel::new();
    assert!(channel
        .offer(cortex.extract("@fnA #modelB /api(keyC)", &index).mentions)
        .unwrap()
        .is_some());
    assert!(channel
        .offer(cortex.extract("#modelB /api(keyC) @fnA", &index).mentions)
        .unwrap()
        .is_none());
}

// ============================================================================
// Dedup and unresolved tokens
// ============================================================================

#[test]
fn test_repeated_token_yields_one_mention() {
    let mentions = extract_mentions("@fnA then @fnA again", &index());
    assert_eq!(mentions.len(), 1);
    assert_eq!(mentions[0].mention_type(), "functions");
    assert_eq!(mentions[0].id(), "f1");
}

#[test]
fn test_unresolved_token_excluded() {
    assert!(extract_mentions("@doesNotExist", &index()).is_empty());

    let scan = TokenCortex::new().extract("@doesNotExist #nope /api(missing)", &index());
    assert!(scan.mentions.is_empty());
    assert_eq!(scan.stats.tokens_seen, 3);
    assert_eq!(scan.stats.unresolved, 3);
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_api_scenario() {
    let mentions = extract_mentions("fetch via /api(get_orders) then done", &index());
    assert_eq!(mentions.len(), 1);

    let json = serde_json::to_value(&mentions[0]).unwrap();
    assert_eq!(json["mention_type"], "apis");
    assert_eq!(json["id"], "a1");
    assert_eq!(json["name"], "Get Orders");
    assert_eq!(json["data"]["key"], "get_orders");
}

#[test]
fn test_empty_text_does_not_fire() {
    let mut channel = MentionChannel::new();
    let mentions = extract_mentions("", &index());
    assert!(mentions.is_empty());
    assert!(channel.offer(mentions).unwrap().is_none());

    // Also after a previous empty emission
    channel.offer(extract_mentions("@fnA", &index())).unwrap();
    assert_eq!(channel.offer(vec![]).unwrap(), Some(vec![]));
    assert!(channel.offer(extract_mentions("", &index())).unwrap().is_none());
}

#[test]
fn test_field_tokens_are_never_mentions() {
    let text = "{{model.orders.total}} and {{input.id}}";
    assert!(extract_mentions(text, &index()).is_empty());

    let spans = TokenCortex::new().highlight(text, &index());
    assert_eq!(spans.len(), 2);
    assert!(spans.iter().all(|s| s.resolved));
}
