//! Round lifecycle controller
//!
//! Drives one round through `Idle → Collecting → Synthesizing → Idle`:
//! opens the server-side window, runs the polling and countdown tasks,
//! closes the window on expiry, and hands the deduplicated texts to
//! synthesis. A manual cancel is observable by both tasks within one
//! tick, and a round-generation counter gates late-arriving synthesis
//! results so a stale response never mutates a round that is already
//! over.

use crate::client::RoundApi;
use crate::reconciler::RoundView;
use crowdmsg_common::events::{EventBus, RoundEvent};
use crowdmsg_common::{Error, Result, SynthesisResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Round lifecycle phase (presentation-facing states live downstream)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Idle,
    Collecting,
    Synthesizing,
}

/// Timing configuration for a round
#[derive(Debug, Clone)]
pub struct RoundConfig {
    /// How long the collection window stays open
    pub collect_duration: Duration,
    /// Cadence of snapshot polls while collecting
    pub poll_interval: Duration,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            collect_duration: Duration::from_secs(30),
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// Owns the round lifecycle; one round active at a time
pub struct RoundController {
    api: Arc<dyn RoundApi>,
    events: EventBus,
    config: RoundConfig,
    phase: Mutex<RoundPhase>,
    /// Bumped on every round start and on cancel; a synthesis result
    /// whose generation no longer matches is dropped
    generation: AtomicU64,
    cancel_token: Mutex<CancellationToken>,
}

impl RoundController {
    pub fn new(api: Arc<dyn RoundApi>, events: EventBus, config: RoundConfig) -> Self {
        Self {
            api,
            events,
            config,
            phase: Mutex::new(RoundPhase::Idle),
            generation: AtomicU64::new(0),
            cancel_token: Mutex::new(CancellationToken::new()),
        }
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> RoundPhase {
        *self.phase.lock().unwrap()
    }

    /// Event bus carrying this controller's round events
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    fn set_phase(&self, phase: RoundPhase) {
        *self.phase.lock().unwrap() = phase;
    }

    /// Run one complete round
    ///
    /// Resolves to `Ok(Some(result))` on a successful synthesis,
    /// `Ok(None)` when the round was cancelled or collected nothing,
    /// and `Err` when a server call or the synthesis itself failed.
    /// Every outcome is also emitted on the event bus.
    pub async fn run_round(&self) -> Result<Option<SynthesisResult>> {
        {
            let mut phase = self.phase.lock().unwrap();
            if *phase != RoundPhase::Idle {
                return Err(Error::InvalidInput(
                    "A round is already active".to_string(),
                ));
            }
            *phase = RoundPhase::Collecting;
        }

        let my_generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let round_token = CancellationToken::new();
        *self.cancel_token.lock().unwrap() = round_token.clone();
        // Polling stops on normal window close too, without cancelling
        // the whole round
        let poll_token = round_token.child_token();

        if let Err(e) = self.api.start_round().await {
            self.set_phase(RoundPhase::Idle);
            return Err(e);
        }
        info!("Collection window opened for {:?}", self.config.collect_duration);
        self.events.emit(RoundEvent::WindowOpened {
            timestamp: chrono::Utc::now(),
        });

        let view = Arc::new(AsyncMutex::new(RoundView::new()));
        let poll_handle = tokio::spawn(poll_task(
            self.api.clone(),
            view.clone(),
            self.events.clone(),
            poll_token.clone(),
            self.config.poll_interval,
        ));

        // Countdown at one-second granularity; a cancel lands within a tick
        let mut seconds_left = self.config.collect_duration.as_secs();
        let mut cancelled = false;
        while seconds_left > 0 {
            self.events.emit(RoundEvent::CountdownTick { seconds_left });
            tokio::select! {
                _ = round_token.cancelled() => {
                    cancelled = true;
                    break;
                }
                _ = tokio::time::sleep(Duration::from_secs(1)) => {
                    seconds_left -= 1;
                }
            }
        }

        if cancelled {
            let _ = poll_handle.await;
            self.set_phase(RoundPhase::Idle);
            return Ok(None);
        }

        // Stop polling first, then close the window. A message the
        // server accepts between the last poll and the stop may never
        // reach the view; accepted lossy edge at the window boundary.
        poll_token.cancel();
        let _ = poll_handle.await;

        if let Err(e) = self.api.stop_round().await {
            self.set_phase(RoundPhase::Idle);
            return Err(e);
        }

        let texts: Vec<String> = view.lock().await.ordered_texts().to_vec();
        info!("Collection window closed with {} distinct texts", texts.len());
        self.events.emit(RoundEvent::WindowClosed {
            collected: texts.len(),
        });

        if texts.is_empty() {
            self.events.emit(RoundEvent::SynthesisFailed {
                reason: "No submissions were collected this round".to_string(),
            });
            self.set_phase(RoundPhase::Idle);
            return Ok(None);
        }

        self.set_phase(RoundPhase::Synthesizing);
        let result = tokio::select! {
            result = self.api.synthesize(&texts) => result,
            _ = round_token.cancelled() => {
                debug!("Round cancelled while synthesizing; dropping the in-flight call");
                self.set_phase(RoundPhase::Idle);
                return Ok(None);
            }
        };

        // Stale-result gate: a cancel that raced the response bumped
        // the generation, so the response is discarded here instead of
        // mutating a round that is already over
        if self.generation.load(Ordering::SeqCst) != my_generation {
            debug!("Discarding stale synthesis result");
            self.set_phase(RoundPhase::Idle);
            return Ok(None);
        }

        self.set_phase(RoundPhase::Idle);
        match result {
            Ok(result) => {
                self.events.emit(RoundEvent::SynthesisReady {
                    explanation: result.explanation.clone(),
                    prompt: result.prompt.clone(),
                });
                Ok(Some(result))
            }
            Err(e) => {
                self.events.emit(RoundEvent::SynthesisFailed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Clear the server-side store and run a fresh round
    pub async fn reset_and_run(&self) -> Result<Option<SynthesisResult>> {
        self.api.reset_round().await?;
        self.run_round().await
    }

    /// Cancel the current round (or clear leftover state when idle)
    ///
    /// Invalidates any in-flight synthesis, stops the polling and
    /// countdown tasks, and resets the server-side store.
    pub async fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cancel_token.lock().unwrap().cancel();

        if let Err(e) = self.api.reset_round().await {
            warn!("Reset after cancel failed: {}", e);
        }

        self.set_phase(RoundPhase::Idle);
        self.events.emit(RoundEvent::RoundCancelled);
    }
}

/// Snapshot polling loop: fetch, reconcile, notify, repeat
async fn poll_task(
    api: Arc<dyn RoundApi>,
    view: Arc<AsyncMutex<RoundView>>,
    events: EventBus,
    token: CancellationToken,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                debug!("Polling stopped");
                break;
            }
            _ = ticker.tick() => {
                match api.fetch_submissions().await {
                    Ok(snapshot) => {
                        let fresh = view.lock().await.absorb(&snapshot);
                        for entry in fresh {
                            events.emit(RoundEvent::SubmissionSeen {
                                sender: entry.from,
                                text: entry.text,
                            });
                        }
                    }
                    // A failed poll is skipped; the next tick retries,
                    // no backoff
                    Err(e) => warn!("Failed to fetch submissions: {}", e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_match_reference_timing() {
        let config = RoundConfig::default();
        assert_eq!(config.collect_duration, Duration::from_secs(30));
        assert_eq!(config.poll_interval, Duration::from_secs(1));
    }
}
