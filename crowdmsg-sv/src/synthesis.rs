//! Generative service gateway
//!
//! One outbound chat-completion call per synthesis request, no retry.
//! The gateway is behind a trait so the HTTP handler can be tested with
//! a mock and so a retry policy could be layered on later without
//! touching the window state machine.

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-4o";
const SYSTEM_PROMPT: &str = "You are a creative improvisation coach.";

/// Explicit timeout on the outbound call; an unbounded hang would leave
/// a round stuck in Synthesizing with no escape but a manual cancel.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// External synthesis service seam
#[async_trait]
pub trait SynthesisGateway: Send + Sync {
    /// Send the round's entries once and return the raw model text
    async fn synthesize(&self, entries: &[String]) -> Result<String>;
}

/// Chat-completion request body
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// OpenAI chat-completions gateway
pub struct OpenAiGateway {
    http_client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

impl OpenAiGateway {
    /// Build the gateway; `api_key` may be absent, in which case every
    /// synthesize call fails while the rest of the server keeps serving
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key,
            endpoint: OPENAI_CHAT_URL.to_string(),
        })
    }
}

#[async_trait]
impl SynthesisGateway for OpenAiGateway {
    async fn synthesize(&self, entries: &[String]) -> Result<String> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| Error::Synthesis("OPENAI_API_KEY is not configured".to_string()))?;

        let request = ChatRequest {
            model: MODEL.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_prompt(entries),
                },
            ],
        };

        tracing::debug!("Sending {} entries for synthesis", entries.len());

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Synthesis(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Synthesis(format!(
                "Service returned {}: {}",
                status, body
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Synthesis(format!("Unreadable response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(Error::Synthesis("Service returned an empty body".to_string()));
        }

        tracing::info!("Synthesis complete ({} chars)", content.len());
        Ok(content)
    }
}

/// Build the user prompt: task framing, output contract, then the
/// numbered entries
fn build_prompt(entries: &[String]) -> String {
    let numbered = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("{}. {}", i + 1, entry))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Your primary task is to take the list of entries I give you and synthesize \
them into a single sentence that will serve as an improv prompt for a group to \
create a scene. Do not just literally combine the words; find the deeper \
relationships between the entries and use those connections as your main \
inspiration, following their overall direction rather than forcing every item \
into the scenario literally.\n\
\n\
When creating this sentence, consider:\n\
1. Can this be easily acted out by an improv group?\n\
2. Can this scenario reach a conclusion within 3 minutes?\n\
3. Does the scenario make sense logistically?\n\
\n\
The prompt sentence must never explain what will happen; it should drop the \
audience at the start of an action, like: 'A palm reader offers a reading to a \
repeat client.' It should have no more than five grammatical clauses, never be \
a run-on sentence, and should leave room for 2 to 4 characters to interact.\n\
\n\
After the prompt, on the next line, write a five-sentence explanation of how \
you arrived at the idea. The explanation must be written in CAVEMAN talk, \
referring to yourself as 'COMPUTER'. The first sentence should list 3 to 4 of \
the entries and exclaim \"(entry 1), (entry 2), (entry 3) COMPUTER THINKS - \" \
and then explain what COMPUTER thinks about this prompt. Write the explanation \
in sporadic caps with occasional mis-spellings and arbitrary capitalization, \
like: \"hOw aRE yuuUU\".\n\
{}",
        numbered
    )
}
