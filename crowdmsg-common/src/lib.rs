//! # Crowdmsg Common Library
//!
//! Shared code for the crowdmsg modules including:
//! - Wire/API request and response types
//! - Round event types (RoundEvent enum) and EventBus
//! - Synthesis response parsing
//! - Configuration resolution
//! - Common error types

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod synthesis;

pub use error::{Error, Result};
pub use synthesis::SynthesisResult;
