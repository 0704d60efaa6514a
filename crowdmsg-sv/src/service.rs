//! Collection window state machine and service
//!
//! `CollectionService` owns the window flag and the submission store
//! behind one lock, so every mutation and every snapshot read is
//! serialized: concurrent webhook deliveries cannot lose appends and a
//! snapshot never reflects a partial append. Window duration is not a
//! concern here; the round controller owns the countdown and this
//! service is a pure accept/reject gate.

use crate::store::{Submission, SubmissionStore};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Collection window state: a two-state accept/reject gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Closed,
    Open,
}

/// Outcome of one ingestion attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Message appended to the store
    Accepted,
    /// Sender or text empty after trimming; dropped
    InvalidSubmission,
    /// Window closed; dropped
    WindowClosed,
}

#[derive(Debug)]
struct Inner {
    window: WindowState,
    opened_at: Option<DateTime<Utc>>,
    store: SubmissionStore,
}

/// Shared server-side state: window flag + submission store
///
/// Constructed once at process start and passed by `Arc` to all
/// handlers; no module-level globals.
#[derive(Debug)]
pub struct CollectionService {
    inner: RwLock<Inner>,
}

impl CollectionService {
    /// Create a new service with the window Closed and the store empty
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                window: WindowState::Closed,
                opened_at: None,
                store: SubmissionStore::new(),
            }),
        }
    }

    /// Open the window and clear the store
    ///
    /// Calling this while already Open re-clears and stays Open; the
    /// state machine does not prevent a mid-round restart.
    pub async fn start(&self) {
        let mut inner = self.inner.write().await;
        inner.store.clear();
        inner.window = WindowState::Open;
        inner.opened_at = Some(Utc::now());
        info!("Submissions window OPEN");
    }

    /// Close the window, preserving store contents for retrieval
    pub async fn stop(&self) {
        let mut inner = self.inner.write().await;
        inner.window = WindowState::Closed;
        inner.opened_at = None;
        info!("Submissions window CLOSED ({} collected)", inner.store.len());
    }

    /// Close the window and clear the store
    pub async fn reset(&self) {
        let mut inner = self.inner.write().await;
        inner.window = WindowState::Closed;
        inner.opened_at = None;
        inner.store.clear();
        info!("Submissions RESET, window CLOSED");
    }

    /// Whether the window currently accepts submissions
    pub async fn is_open(&self) -> bool {
        self.inner.read().await.window == WindowState::Open
    }

    /// Conditionally append one inbound message
    ///
    /// Both fields are trimmed; empty sender or text drops the message,
    /// as does a closed window. Dropped messages are logged, never
    /// surfaced to the sender.
    pub async fn ingest(&self, sender: &str, text: &str) -> IngestOutcome {
        let sender = sender.trim();
        let text = text.trim();

        if sender.is_empty() || text.is_empty() {
            debug!("Dropping submission with empty sender or text");
            return IngestOutcome::InvalidSubmission;
        }

        let mut inner = self.inner.write().await;
        if inner.window != WindowState::Open {
            info!("REJECTED {} : {} (window closed)", sender, text);
            return IngestOutcome::WindowClosed;
        }

        inner
            .store
            .append(sender.to_string(), text.to_string(), Utc::now());
        info!("{} : {}", sender, text);
        IngestOutcome::Accepted
    }

    /// Copy of the store contents, in arrival order
    pub async fn snapshot(&self) -> Vec<Submission> {
        self.inner.read().await.store.snapshot()
    }
}

impl Default for CollectionService {
    fn default() -> Self {
        Self::new()
    }
}
