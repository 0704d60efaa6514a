//! Common error types for crowdmsg modules

use thiserror::Error;

/// Common result type for crowdmsg operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across crowdmsg modules
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network-level failure talking to the submission server
    #[error("Transport error: {0}")]
    Transport(String),

    /// Server answered with a non-success status
    #[error("Server error: {0}")]
    Server(String),

    /// Generative service call failed (network, status, or empty body)
    #[error("Synthesis failed: {0}")]
    Synthesis(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
