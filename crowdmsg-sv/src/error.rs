//! Error types for crowdmsg-sv
//!
//! Defines module-specific error types using thiserror for clear error
//! propagation. Handler-level rejections (empty entries, closed window)
//! are expressed as HTTP responses or `IngestOutcome`, not as errors,
//! so the taxonomy here stays small.

use thiserror::Error;

/// Main error type for the submission server
#[derive(Error, Debug)]
pub enum Error {
    /// Generative service call failed (network, status, or empty body)
    #[error("Synthesis failed: {0}")]
    Synthesis(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using crowdmsg-sv Error
pub type Result<T> = std::result::Result<T, Error>;
