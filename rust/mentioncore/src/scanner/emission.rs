//! MentionChannel: idempotent mention notifications
//!
//! Mentions are sorted by id and serialized; the host is only notified when
//! the serialization differs from the last one delivered. Consecutive
//! identical sets are never emitted twice.

use serde::{Deserialize, Serialize};

use super::extract::{sort_mentions, Mention};
use crate::error::MentionError;

/// Channel counters
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub offers: u64,
    pub emitted: u64,
    pub suppressed: u64,
}

#[derive(Debug, Clone)]
pub struct MentionChannel {
    /// Serialization of the last delivered (sorted) set
    last_serialized: String,
    last: Vec<Mention>,
    stats: ChannelStats,
}

const EMPTY_SET: &str = "[]";

impl Default for MentionChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl MentionChannel {
    /// The host starts with no mentions, so an empty first offer is suppressed
    pub fn new() -> Self {
        Self {
            last_serialized: EMPTY_SET.to_string(),
            last: Vec::new(),
            stats: ChannelStats::default(),
        }
    }

    /// Seed the cache with the mentions the host already holds
    pub fn prime(&mut self, mut mentions: Vec<Mention>) -> Result<(), MentionError> {
        sort_mentions(&mut mentions);
        self.last_serialized = serde_json::to_string(&mentions)?;
        self.last = mentions;
        Ok(())
    }

    /// Offer the current set. Returns the sorted set when the host must be notified.
    pub fn offer(&mut self, mut mentions: Vec<Mention>) -> Result<Option<Vec<Mention>>, MentionError> {
        self.stats.offers += 1;
        sort_mentions(&mut mentions);
        let serialized = serde_json::to_string(&mentions)?;

        if serialized == self.last_serialized {
            self.stats.suppressed += 1;
            return Ok(None);
        }

        self.last_serialized = serialized;
        self.last = mentions.clone();
        self.stats.emitted += 1;
        Ok(Some(mentions))
    }

    /// Last set delivered to the host, sorted by id
    pub fn last(&self) -> &[Mention] {
        &self.last
    }

    pub fn stats(&self) -> &ChannelStats {
        &self.stats
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
