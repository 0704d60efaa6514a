//! HTTP request handlers
//!
//! Implements the window control, snapshot, webhook ingestion, and
//! synthesis proxy endpoints.

use crate::api::server::AppContext;
use axum::{
    extract::{Form, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use crowdmsg_common::api::{
    ErrorResponse, HealthResponse, SmsWebhook, SubmissionsResponse, SynthesizeRequest,
    SynthesizeResponse,
};
use tracing::{error, info};

/// Empty acknowledgement envelope expected by the messaging gateway
/// regardless of whether the message was accepted
const TWIML_EMPTY: &str = "<Response></Response>";

/// GET / - Liveness line
pub async fn root() -> &'static str {
    "crowdmsg submission server is running."
}

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "submission_server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /start-submissions - Open the window and clear the store
pub async fn start_submissions(State(ctx): State<AppContext>) -> &'static str {
    ctx.service.start().await;
    "Submissions window started."
}

/// POST /stop-submissions - Close the window, keep the collected round
pub async fn stop_submissions(State(ctx): State<AppContext>) -> &'static str {
    ctx.service.stop().await;
    "Submissions window stopped."
}

/// POST /reset-submissions - Close the window and clear the store
pub async fn reset_submissions(State(ctx): State<AppContext>) -> &'static str {
    ctx.service.reset().await;
    "Submissions reset."
}

/// GET /submissions - Snapshot read for the polling reconciler
pub async fn get_submissions(State(ctx): State<AppContext>) -> Json<SubmissionsResponse> {
    let submissions = ctx
        .service
        .snapshot()
        .await
        .iter()
        .map(|s| s.to_entry())
        .collect();
    Json(SubmissionsResponse { submissions })
}

/// POST /sms - Inbound webhook from the messaging gateway
///
/// Fire-and-forget semantics: the gateway expects an empty TwiML
/// acknowledgement whether or not the message was accepted, so every
/// outcome answers 200. Acceptance is decided by the service.
pub async fn sms_webhook(
    State(ctx): State<AppContext>,
    Form(payload): Form<SmsWebhook>,
) -> impl IntoResponse {
    let sender = payload.from.unwrap_or_default();
    let body = payload.body.unwrap_or_default();

    let outcome = ctx.service.ingest(&sender, &body).await;
    tracing::debug!("Webhook ingest outcome: {:?}", outcome);

    ([(header::CONTENT_TYPE, "text/xml")], TWIML_EMPTY)
}

/// POST /synthesize - Send the round's entries to the generative service
///
/// Rejects an empty entries list outright; otherwise exactly one call
/// to the external service, no retry.
pub async fn synthesize(
    State(ctx): State<AppContext>,
    Json(request): Json<SynthesizeRequest>,
) -> Result<Json<SynthesizeResponse>, (StatusCode, Json<ErrorResponse>)> {
    if request.entries.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "No entries provided.".to_string(),
            }),
        ));
    }

    info!("Received {} entries for synthesis", request.entries.len());

    match ctx.gateway.synthesize(&request.entries).await {
        Ok(result) => Ok(Json(SynthesizeResponse { result })),
        Err(e) => {
            error!("Synthesis failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to synthesize prompt: {}", e),
                }),
            ))
        }
    }
}
