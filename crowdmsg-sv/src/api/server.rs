//! HTTP server setup and routing
//!
//! Sets up the Axum router for the window control endpoints, the
//! snapshot read, the ingestion webhook, and the synthesis proxy.

use crate::service::CollectionService;
use crate::synthesis::SynthesisGateway;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared application context passed to all handlers
///
/// AppContext implements Clone, which gives us `FromRef<AppContext>`
/// for free via Axum's blanket implementation.
#[derive(Clone)]
pub struct AppContext {
    /// Window state machine + submission store, one lock over both
    pub service: Arc<CollectionService>,
    /// External generative service seam
    pub gateway: Arc<dyn SynthesisGateway>,
}

/// Build the application router with all routes attached
pub fn build_router(ctx: AppContext) -> Router {
    Router::new()
        // Liveness line for humans
        .route("/", get(super::handlers::root))
        // Health endpoint
        .route("/health", get(super::handlers::health))
        // Collection window control
        .route("/start-submissions", post(super::handlers::start_submissions))
        .route("/stop-submissions", post(super::handlers::stop_submissions))
        .route("/reset-submissions", post(super::handlers::reset_submissions))
        // Snapshot read for the polling reconciler
        .route("/submissions", get(super::handlers::get_submissions))
        // Ingestion webhook from the messaging gateway
        .route("/sms", post(super::handlers::sms_webhook))
        // Synthesis proxy
        .route("/synthesize", post(super::handlers::synthesize))
        // Attach application context
        .with_state(ctx)
        // Enable CORS for local access
        .layer(CorsLayer::permissive())
}
