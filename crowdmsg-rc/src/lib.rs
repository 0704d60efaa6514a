//! Round controller (crowdmsg-rc) library
//!
//! Client side of the crowd-message round: drives the collection
//! window over the server's HTTP surface, polls and deduplicates the
//! submission log, and hands the collected texts off for synthesis.
//! Presentation subscribes to the shared `EventBus` and contains no
//! orchestration logic of its own.

pub mod client;
pub mod controller;
pub mod reconciler;

pub use client::{RoundApi, ServerClient};
pub use controller::{RoundConfig, RoundController, RoundPhase};
pub use reconciler::RoundView;
