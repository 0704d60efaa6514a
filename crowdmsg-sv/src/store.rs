//! Append-only submission store
//!
//! The single source of truth for one round's accepted messages.
//! Arrival order is preserved; duplicates with the same `(sender, text)`
//! pair are kept raw here and collapsed by consumers.

use chrono::{DateTime, Utc};
use crowdmsg_common::api::SubmissionEntry;

/// One accepted message, immutable once appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Sender identifier as reported by the messaging gateway
    pub sender: String,
    /// Trimmed message text
    pub text: String,
    /// Server-side receive time
    pub received_at: DateTime<Utc>,
}

impl Submission {
    /// Wire representation served by `GET /submissions`
    pub fn to_entry(&self) -> SubmissionEntry {
        SubmissionEntry {
            from: self.sender.clone(),
            text: self.text.clone(),
        }
    }
}

/// Ordered log of accepted submissions for the current round
#[derive(Debug, Default)]
pub struct SubmissionStore {
    entries: Vec<Submission>,
}

impl SubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a submission, preserving arrival order
    pub fn append(&mut self, sender: String, text: String, received_at: DateTime<Utc>) {
        self.entries.push(Submission {
            sender,
            text,
            received_at,
        });
    }

    /// Drop all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of the current contents, in arrival order
    pub fn snapshot(&self) -> Vec<Submission> {
        self.entries.clone()
    }
}
