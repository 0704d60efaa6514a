//! Parsing of the generative service's two-part response
//!
//! The service is prompted to answer with two segments separated by a
//! newline. The raw text is split on the *first* newline only:
//! `explanation` is the first trimmed segment and `prompt` the second
//! (empty when no newline is present). The positional binding is
//! intentionally preserved from the shipped behavior; downstream
//! presentation decides which segment lands in which screen slot.

use serde::{Deserialize, Serialize};

/// Parsed synthesis output, split positionally from the raw model text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisResult {
    /// First segment of the response, trimmed
    pub explanation: String,
    /// Everything after the first newline, trimmed; empty if no newline
    pub prompt: String,
}

impl SynthesisResult {
    /// Split raw model output on the first newline into the two segments
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('\n') {
            Some((first, rest)) => Self {
                explanation: first.trim().to_string(),
                prompt: rest.trim().to_string(),
            },
            None => Self {
                explanation: raw.trim().to_string(),
                prompt: String::new(),
            },
        }
    }
}
