//! Integration tests for the crowdmsg-sv API endpoints
//!
//! Tests cover:
//! - Collection window control (start/stop/reset) and its effect on the store
//! - Webhook ingestion: acceptance, trimming, silent drops, TwiML ack
//! - Snapshot reads in arrival order
//! - Synthesis proxy: empty-entries rejection, passthrough, failure mapping

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use crowdmsg_sv::api::{build_router, AppContext};
use crowdmsg_sv::error::{Error, Result};
use crowdmsg_sv::service::CollectionService;
use crowdmsg_sv::synthesis::SynthesisGateway;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt; // for `oneshot` method

/// Gateway double recording calls and answering from a canned script
struct MockGateway {
    calls: AtomicUsize,
    last_entries: Mutex<Vec<String>>,
    response: Mutex<Result<String>>,
}

impl MockGateway {
    fn replying(raw: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            last_entries: Mutex::new(Vec::new()),
            response: Mutex::new(Ok(raw.to_string())),
        })
    }

    fn failing(cause: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            last_entries: Mutex::new(Vec::new()),
            response: Mutex::new(Err(Error::Synthesis(cause.to_string()))),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SynthesisGateway for MockGateway {
    async fn synthesize(&self, entries: &[String]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_entries.lock().unwrap() = entries.to_vec();
        match &*self.response.lock().unwrap() {
            Ok(raw) => Ok(raw.clone()),
            Err(Error::Synthesis(cause)) => Err(Error::Synthesis(cause.clone())),
            Err(_) => Err(Error::Internal("unexpected mock state".to_string())),
        }
    }
}

/// Test helper: app plus handles on its service and gateway double
fn setup_app(gateway: Arc<MockGateway>) -> (axum::Router, Arc<CollectionService>) {
    let service = Arc::new(CollectionService::new());
    let ctx = AppContext {
        service: service.clone(),
        gateway,
    };
    (build_router(ctx), service)
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn sms_request(form_body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/sms")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form_body.to_string()))
        .unwrap()
}

fn synthesize_request(entries: &[&str]) -> Request<Body> {
    let body = serde_json::json!({ "entries": entries }).to_string();
    Request::builder()
        .method("POST")
        .uri("/synthesize")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn body_text(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Should be UTF-8")
}

// =============================================================================
// Health / liveness
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = setup_app(MockGateway::replying("x"));

    let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response.into_body()).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["module"], "submission_server");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_root_liveness_line() {
    let (app, _) = setup_app(MockGateway::replying("x"));

    let response = app.oneshot(empty_request("GET", "/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response.into_body()).await;
    assert!(body.contains("running"));
}

// =============================================================================
// Window control
// =============================================================================

#[tokio::test]
async fn test_start_ack_and_open_window() {
    let (app, service) = setup_app(MockGateway::replying("x"));

    let response = app
        .oneshot(empty_request("POST", "/start-submissions"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_text(response.into_body()).await,
        "Submissions window started."
    );
    assert!(service.is_open().await);
}

#[tokio::test]
async fn test_stop_preserves_collected_round() {
    let (app, service) = setup_app(MockGateway::replying("x"));

    app.clone()
        .oneshot(empty_request("POST", "/start-submissions"))
        .await
        .unwrap();
    app.clone()
        .oneshot(sms_request("From=%2B15551234567&Body=hello"))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(empty_request("POST", "/stop-submissions"))
        .await
        .unwrap();
    assert_eq!(
        body_text(response.into_body()).await,
        "Submissions window stopped."
    );
    assert!(!service.is_open().await);

    // Collected round survives the stop
    let response = app.oneshot(empty_request("GET", "/submissions")).await.unwrap();
    let body = body_json(response.into_body()).await;
    assert_eq!(body["submissions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_reset_clears_from_any_state() {
    let (app, service) = setup_app(MockGateway::replying("x"));

    app.clone()
        .oneshot(empty_request("POST", "/start-submissions"))
        .await
        .unwrap();
    app.clone()
        .oneshot(sms_request("From=%2B15551234567&Body=hello"))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(empty_request("POST", "/reset-submissions"))
        .await
        .unwrap();
    assert_eq!(body_text(response.into_body()).await, "Submissions reset.");
    assert!(!service.is_open().await);

    let response = app.oneshot(empty_request("GET", "/submissions")).await.unwrap();
    let body = body_json(response.into_body()).await;
    assert_eq!(body["submissions"].as_array().unwrap().len(), 0);
}

// =============================================================================
// Webhook ingestion
// =============================================================================

#[tokio::test]
async fn test_sms_accepted_while_open() {
    let (app, _) = setup_app(MockGateway::replying("x"));

    app.clone()
        .oneshot(empty_request("POST", "/start-submissions"))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(sms_request("From=%2B15551234567&Body=hello+world"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/xml"
    );
    assert_eq!(body_text(response.into_body()).await, "<Response></Response>");

    let response = app.oneshot(empty_request("GET", "/submissions")).await.unwrap();
    let body = body_json(response.into_body()).await;
    assert_eq!(
        body["submissions"][0],
        serde_json::json!({"from": "+15551234567", "text": "hello world"})
    );
}

#[tokio::test]
async fn test_sms_rejected_while_closed_still_acks() {
    let (app, _) = setup_app(MockGateway::replying("x"));

    // Window never opened
    let response = app
        .clone()
        .oneshot(sms_request("From=%2B15551234567&Body=too+early"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response.into_body()).await, "<Response></Response>");

    let response = app.oneshot(empty_request("GET", "/submissions")).await.unwrap();
    let body = body_json(response.into_body()).await;
    assert_eq!(body["submissions"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_sms_with_blank_body_is_dropped() {
    let (app, _) = setup_app(MockGateway::replying("x"));

    app.clone()
        .oneshot(empty_request("POST", "/start-submissions"))
        .await
        .unwrap();

    // Whitespace-only body and missing sender are both dropped silently
    app.clone()
        .oneshot(sms_request("From=%2B15551234567&Body=+++"))
        .await
        .unwrap();
    app.clone().oneshot(sms_request("Body=orphan")).await.unwrap();

    let response = app.oneshot(empty_request("GET", "/submissions")).await.unwrap();
    let body = body_json(response.into_body()).await;
    assert_eq!(body["submissions"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_snapshot_preserves_arrival_order_with_duplicates() {
    let (app, _) = setup_app(MockGateway::replying("x"));

    app.clone()
        .oneshot(empty_request("POST", "/start-submissions"))
        .await
        .unwrap();
    for body in ["Body=hello&From=%2B15551234567", "Body=hello&From=%2B15551234567", "Body=bye&From=%2B15557654321"] {
        app.clone().oneshot(sms_request(body)).await.unwrap();
    }

    let response = app.oneshot(empty_request("GET", "/submissions")).await.unwrap();
    let body = body_json(response.into_body()).await;
    let submissions = body["submissions"].as_array().unwrap();

    // The store keeps raw duplicates; collapsing is the reconciler's job
    assert_eq!(submissions.len(), 3);
    assert_eq!(submissions[0]["text"], "hello");
    assert_eq!(submissions[1]["text"], "hello");
    assert_eq!(submissions[2]["text"], "bye");
}

// =============================================================================
// Synthesis proxy
// =============================================================================

#[tokio::test]
async fn test_synthesize_empty_entries_never_calls_service() {
    let gateway = MockGateway::replying("should not be used");
    let (app, _) = setup_app(gateway.clone());

    let response = app.oneshot(synthesize_request(&[])).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response.into_body()).await;
    assert_eq!(body["error"], "No entries provided.");
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn test_synthesize_passes_entries_through() {
    let gateway = MockGateway::replying("caveman line\nfinal prompt sentence.");
    let (app, _) = setup_app(gateway.clone());

    let response = app
        .oneshot(synthesize_request(&["pizza", "the moon"]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response.into_body()).await;
    assert_eq!(body["result"], "caveman line\nfinal prompt sentence.");
    assert_eq!(gateway.call_count(), 1);
    assert_eq!(
        *gateway.last_entries.lock().unwrap(),
        vec!["pizza".to_string(), "the moon".to_string()]
    );
}

#[tokio::test]
async fn test_synthesize_failure_maps_to_500() {
    let gateway = MockGateway::failing("connection refused");
    let (app, _) = setup_app(gateway.clone());

    let response = app.oneshot(synthesize_request(&["pizza"])).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response.into_body()).await;
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("connection refused"));
    assert_eq!(gateway.call_count(), 1);
}
