//! HTTP client for the submission server
//!
//! All round-lifecycle calls go through the `RoundApi` trait so the
//! controller can be tested against a double, and so retry policy could
//! be layered on later without touching the round state machine. The
//! live implementation is deliberately fire-and-forget: one request per
//! call, no retry.

use async_trait::async_trait;
use crowdmsg_common::api::{
    ErrorResponse, SubmissionEntry, SubmissionsResponse, SynthesizeRequest, SynthesizeResponse,
};
use crowdmsg_common::{Error, Result, SynthesisResult};
use std::time::Duration;

/// Bounded timeout for window-control and snapshot calls
const POLL_TIMEOUT: Duration = Duration::from_secs(10);

/// Synthesis is allowed to run longer; the server's own upstream call
/// is capped at 60 s, so this only has to outlast that
const SYNTHESIS_TIMEOUT: Duration = Duration::from_secs(75);

/// Server operations needed to drive one round
#[async_trait]
pub trait RoundApi: Send + Sync {
    /// Open the collection window (clears the server-side store)
    async fn start_round(&self) -> Result<()>;

    /// Close the collection window, preserving collected messages
    async fn stop_round(&self) -> Result<()>;

    /// Close the window and clear the server-side store
    async fn reset_round(&self) -> Result<()>;

    /// Fetch the full current submission snapshot
    async fn fetch_submissions(&self) -> Result<Vec<SubmissionEntry>>;

    /// Submit the round's texts for synthesis and parse the reply
    async fn synthesize(&self, entries: &[String]) -> Result<SynthesisResult>;
}

/// Live HTTP client against the submission server
pub struct ServerClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ServerClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(POLL_TIMEOUT)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST to a window-control endpoint and require a success status
    async fn post_control(&self, path: &str) -> Result<()> {
        let response = self
            .http_client
            .post(self.url(path))
            .send()
            .await
            .map_err(|e| Error::Transport(format!("{} failed: {}", path, e)))?;

        if !response.status().is_success() {
            return Err(Error::Server(format!(
                "{} returned {}",
                path,
                response.status()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RoundApi for ServerClient {
    async fn start_round(&self) -> Result<()> {
        self.post_control("/start-submissions").await
    }

    async fn stop_round(&self) -> Result<()> {
        self.post_control("/stop-submissions").await
    }

    async fn reset_round(&self) -> Result<()> {
        self.post_control("/reset-submissions").await
    }

    async fn fetch_submissions(&self) -> Result<Vec<SubmissionEntry>> {
        let response = self
            .http_client
            .get(self.url("/submissions"))
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Snapshot fetch failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Server(format!(
                "/submissions returned {}",
                response.status()
            )));
        }

        let parsed: SubmissionsResponse = response
            .json()
            .await
            .map_err(|e| Error::Transport(format!("Unreadable snapshot: {}", e)))?;

        Ok(parsed.submissions)
    }

    async fn synthesize(&self, entries: &[String]) -> Result<SynthesisResult> {
        if entries.is_empty() {
            return Err(Error::InvalidInput(
                "Cannot synthesize an empty round".to_string(),
            ));
        }

        let request = SynthesizeRequest {
            entries: entries.to_vec(),
        };

        let response = self
            .http_client
            .post(self.url("/synthesize"))
            .timeout(SYNTHESIS_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Synthesis(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            // Surface the server's cause string when it sent one
            let cause = response
                .json::<ErrorResponse>()
                .await
                .map(|e| e.error)
                .unwrap_or_else(|_| format!("status {}", status));
            return Err(Error::Synthesis(cause));
        }

        let parsed: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| Error::Synthesis(format!("Unreadable response: {}", e)))?;

        if parsed.result.trim().is_empty() {
            return Err(Error::Synthesis("Empty synthesis result".to_string()));
        }

        Ok(SynthesisResult::parse(&parsed.result))
    }
}
