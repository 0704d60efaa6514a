//! Polling reconciler state
//!
//! Converts the server's raw, possibly-duplicated submission log into a
//! deduplicated, first-seen-ordered local view. The server serves full
//! snapshots only, so every poll rescans the whole log against the
//! seen-set; O(snapshot) per poll is fine at seconds-scale SMS volume
//! and is a known scaling limit, not something to optimize away here.

use crowdmsg_common::api::SubmissionEntry;
use std::collections::HashSet;

/// Client-local view of one round, rebuilt fresh each round
#[derive(Debug, Default)]
pub struct RoundView {
    /// Exact-match `(sender, text)` keys seen so far; grows
    /// monotonically within a round
    seen_keys: HashSet<(String, String)>,
    /// Distinct texts in first-seen order
    ordered_texts: Vec<String>,
}

impl RoundView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile one snapshot against the view
    ///
    /// Walks the snapshot in order; entries whose key is new are
    /// recorded and returned so the caller can emit per-submission
    /// notifications. Feeding the same snapshot repeatedly is a no-op.
    pub fn absorb(&mut self, snapshot: &[SubmissionEntry]) -> Vec<SubmissionEntry> {
        let mut fresh = Vec::new();

        for entry in snapshot {
            let key = entry.key();
            if self.seen_keys.insert(key) {
                self.ordered_texts.push(entry.text.trim().to_string());
                fresh.push(entry.clone());
            }
        }

        fresh
    }

    /// Distinct texts collected so far, in first-seen order
    pub fn ordered_texts(&self) -> &[String] {
        &self.ordered_texts
    }

    pub fn len(&self) -> usize {
        self.ordered_texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered_texts.is_empty()
    }
}
