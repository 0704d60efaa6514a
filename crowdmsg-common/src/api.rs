//! Wire types shared by the submission server and the round controller
//!
//! Field names on these types are the wire contract: the messaging
//! gateway posts `From`/`Body` form fields, and the snapshot endpoint
//! serves `{"submissions":[{"from","text"}]}`. Renames are applied with
//! serde attributes rather than by bending the Rust field names.

use serde::{Deserialize, Serialize};

/// One accepted submission as served by `GET /submissions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionEntry {
    /// Sender identifier as reported by the messaging gateway
    pub from: String,
    /// Message text, trimmed at ingestion
    pub text: String,
}

impl SubmissionEntry {
    /// Deduplication key: exact-match `(sender, text)` pair, not normalized
    pub fn key(&self) -> (String, String) {
        (self.from.clone(), self.text.clone())
    }
}

/// Response body of `GET /submissions`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionsResponse {
    pub submissions: Vec<SubmissionEntry>,
}

/// Inbound webhook payload from the messaging gateway (form-encoded)
#[derive(Debug, Clone, Deserialize)]
pub struct SmsWebhook {
    #[serde(rename = "From")]
    pub from: Option<String>,
    #[serde(rename = "Body")]
    pub body: Option<String>,
}

/// Request body of `POST /synthesize`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesizeRequest {
    /// Distinct submission texts in first-seen order
    pub entries: Vec<String>,
}

/// Success response body of `POST /synthesize`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesizeResponse {
    /// Raw free-text model output (two segments split on first newline)
    pub result: String,
}

/// Error envelope returned by the server on 4xx/5xx
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response body of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}
