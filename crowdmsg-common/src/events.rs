//! Round event types and EventBus
//!
//! The orchestrator emits `RoundEvent`s for everything presentation
//! cares about (new submission feedback, countdown, reveal). Delivery
//! is lossy broadcast: a lagging or absent subscriber never blocks the
//! round.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events emitted over the lifetime of one round
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RoundEvent {
    /// Collection window opened on the server; polling has started
    WindowOpened {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A submission key was seen for the first time this round
    ///
    /// Consumed by presentation for audio/visual feedback.
    SubmissionSeen { sender: String, text: String },

    /// Countdown progress, emitted once per second while collecting
    CountdownTick { seconds_left: u64 },

    /// Collection window closed; `collected` distinct texts gathered
    WindowClosed { collected: usize },

    /// Synthesis completed; segments are positional (see SynthesisResult)
    SynthesisReady { explanation: String, prompt: String },

    /// Synthesis failed; the round is over, cause is display-ready
    SynthesisFailed { reason: String },

    /// Round was cancelled mid-flight; server state has been reset
    RoundCancelled,
}

/// Broadcast bus for round events
///
/// Thin wrapper over `tokio::sync::broadcast` so emitters don't have to
/// care whether anyone is listening.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<RoundEvent>,
}

impl EventBus {
    /// Create a new bus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<RoundEvent> {
        self.tx.subscribe()
    }

    /// Emit an event; no subscribers is not an error
    pub fn emit(&self, event: RoundEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::trace!("No event subscribers: {}", e);
        }
    }

    /// Current number of subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}
