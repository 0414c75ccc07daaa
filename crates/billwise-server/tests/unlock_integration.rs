use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use billwise_core::checkout::{CheckoutProvider, CheckoutRequest, CheckoutSession};
use billwise_core::config::{Config, ProviderMode};
use billwise_core::error::CheckoutCreationError;
use billwise_server::app::build_app;
use billwise_server::providers::{CannedGenerator, MockCheckout};
use billwise_server::state::AppState;

const CANNED_PLAN: &str = "Test premium plan: claim rebates, invest the rest.";

fn test_config() -> Config {
    Config {
        port: 0,
        public_url: "http://localhost:3000".to_string(),
        cors_origins: vec![],
        premium_price_cents: 499,
        currency: "cad".to_string(),
        product_name: "Full Savings Strategy Unlock".to_string(),
        session_ttl_minutes: 30,
        session_sweep_interval_ms: 60_000,
        provider_mode: ProviderMode::Mock,
        stripe_secret_key: None,
        generation_api_key: None,
        generation_base_url: "http://localhost:9".to_string(),
        generation_model: "test-model".to_string(),
        generation_max_tokens: 800,
    }
}

fn test_app() -> Router {
    test_app_with_checkout(MockCheckout::new())
}

fn test_app_with_checkout(checkout: MockCheckout) -> Router {
    let state = Arc::new(AppState::new(
        test_config(),
        Arc::new(checkout),
        Arc::new(CannedGenerator::new(CANNED_PLAN)),
    ));
    build_app(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    let request = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("build request");
    app.clone().oneshot(request).await.expect("request")
}

async fn json_body(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse JSON")
}

/// First contact mints the session cookie; later requests must echo it back.
fn session_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get("set-cookie")
        .expect("set-cookie on first contact")
        .to_str()
        .expect("ascii cookie")
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

/// Open a session by hitting the status endpoint once.
async fn open_session(app: &Router) -> String {
    let response = send(app, "GET", "/api/unlock", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response)
}

fn estimate_body() -> Value {
    json!({
        "monthly_bills_cad": 800.0,
        "household_size": 3,
        "motivation": 7,
        "goal": "pay down the mortgage"
    })
}

// ============================================================
// Scenario A: the full happy path, end to end over HTTP
// ============================================================
#[tokio::test]
async fn test_full_unlock_flow_reaches_premium() {
    let app = test_app();
    let sid = open_session(&app).await;

    let response = send(&app, "POST", "/api/estimate", Some(&sid), Some(estimate_body())).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "POST", "/api/unlock/request", Some(&sid), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["phase"], "requested");

    let response = send(&app, "POST", "/api/unlock/confirm", Some(&sid), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["phase"], "confirmed");
    let checkout_url = json["checkout_url"].as_str().expect("checkout url");
    assert!(checkout_url.starts_with("https://checkout.invalid/session/"));

    let response = send(
        &app,
        "GET",
        "/api/unlock/complete?payment=success&checkout_session=cs_test_1",
        Some(&sid),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["unlocked"], true);
    assert_eq!(json["phase"], "unlocked");

    let response = send(&app, "POST", "/api/premium", Some(&sid), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["plan"], CANNED_PLAN);
}

// ============================================================
// Scenario B: decline returns to idle
// ============================================================
#[tokio::test]
async fn test_decline_returns_to_idle() {
    let app = test_app();
    let sid = open_session(&app).await;

    send(&app, "POST", "/api/unlock/request", Some(&sid), None).await;
    let response = send(&app, "POST", "/api/unlock/decline", Some(&sid), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["phase"], "idle");

    let response = send(&app, "GET", "/api/unlock", Some(&sid), None).await;
    assert_eq!(json_body(response).await["unlocked"], false);
}

// ============================================================
// Scenario C: a cancel marker leaves the pending checkout intact
// ============================================================
#[tokio::test]
async fn test_cancel_marker_keeps_confirmed() {
    let app = test_app();
    let sid = open_session(&app).await;

    send(&app, "POST", "/api/unlock/request", Some(&sid), None).await;
    send(&app, "POST", "/api/unlock/confirm", Some(&sid), None).await;

    let response = send(
        &app,
        "GET",
        "/api/unlock/complete?payment=cancel",
        Some(&sid),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["unlocked"], false);
    assert_eq!(json["phase"], "confirmed");
}

// ============================================================
// Scenario D: forged/replayed success marker never unlocks
// ============================================================
#[tokio::test]
async fn test_forged_success_marker_is_rejected() {
    let app = test_app();
    let sid = open_session(&app).await;

    let response = send(
        &app,
        "GET",
        "/api/unlock/complete?payment=success",
        Some(&sid),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        json_body(response).await["error"]["code"],
        "untrusted_completion_signal"
    );

    // The session stays locked at idle.
    let response = send(&app, "GET", "/api/unlock", Some(&sid), None).await;
    let json = json_body(response).await;
    assert_eq!(json["phase"], "idle");
    assert_eq!(json["unlocked"], false);
}

// ============================================================
// Scenario E: provider failure leaves Requested; retry succeeds
// ============================================================
#[tokio::test]
async fn test_checkout_failure_then_retry() {
    let app = test_app_with_checkout(MockCheckout::failing(1));
    let sid = open_session(&app).await;

    send(&app, "POST", "/api/unlock/request", Some(&sid), None).await;

    let response = send(&app, "POST", "/api/unlock/confirm", Some(&sid), None).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        json_body(response).await["error"]["code"],
        "checkout_creation_failed"
    );

    // Still requested, so the same call can simply be retried.
    let response = send(&app, "GET", "/api/unlock", Some(&sid), None).await;
    assert_eq!(json_body(response).await["phase"], "requested");

    let response = send(&app, "POST", "/api/unlock/confirm", Some(&sid), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["phase"], "confirmed");
}

#[tokio::test]
async fn test_confirm_without_request_conflicts() {
    let app = test_app();
    let sid = open_session(&app).await;

    let response = send(&app, "POST", "/api/unlock/confirm", Some(&sid), None).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(response).await["error"]["code"], "invalid_phase");

    let response = send(&app, "GET", "/api/unlock", Some(&sid), None).await;
    assert_eq!(json_body(response).await["phase"], "idle");
}

#[tokio::test]
async fn test_premium_is_locked_before_payment() {
    let app = test_app();
    let sid = open_session(&app).await;

    let response = send(&app, "POST", "/api/premium", Some(&sid), None).await;
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(json_body(response).await["error"]["code"], "payment_required");
}

#[tokio::test]
async fn test_premium_without_estimate_is_rejected() {
    let app = test_app();
    let sid = open_session(&app).await;

    // Unlock without ever submitting the calculator form.
    send(&app, "POST", "/api/unlock/request", Some(&sid), None).await;
    send(&app, "POST", "/api/unlock/confirm", Some(&sid), None).await;
    send(
        &app,
        "GET",
        "/api/unlock/complete?payment=success",
        Some(&sid),
        None,
    )
    .await;

    let response = send(&app, "POST", "/api/premium", Some(&sid), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_reset_relocks_premium() {
    let app = test_app();
    let sid = open_session(&app).await;

    send(&app, "POST", "/api/estimate", Some(&sid), Some(estimate_body())).await;
    send(&app, "POST", "/api/unlock/request", Some(&sid), None).await;
    send(&app, "POST", "/api/unlock/confirm", Some(&sid), None).await;
    send(
        &app,
        "GET",
        "/api/unlock/complete?payment=success",
        Some(&sid),
        None,
    )
    .await;

    let response = send(&app, "POST", "/api/unlock/reset", Some(&sid), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["phase"], "idle");

    let response = send(&app, "POST", "/api/premium", Some(&sid), None).await;
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let app = test_app();

    // Session A pays and unlocks.
    let sid_a = open_session(&app).await;
    send(&app, "POST", "/api/estimate", Some(&sid_a), Some(estimate_body())).await;
    send(&app, "POST", "/api/unlock/request", Some(&sid_a), None).await;
    send(&app, "POST", "/api/unlock/confirm", Some(&sid_a), None).await;
    send(
        &app,
        "GET",
        "/api/unlock/complete?payment=success",
        Some(&sid_a),
        None,
    )
    .await;

    // Session B shares nothing with A and starts over at idle.
    let sid_b = open_session(&app).await;
    assert_ne!(sid_a, sid_b);
    let response = send(&app, "GET", "/api/unlock", Some(&sid_b), None).await;
    let json = json_body(response).await;
    assert_eq!(json["phase"], "idle");
    assert_eq!(json["unlocked"], false);

    // A is still unlocked.
    let response = send(&app, "GET", "/api/unlock", Some(&sid_a), None).await;
    assert_eq!(json_body(response).await["unlocked"], true);
}

/// Checkout Provider that takes seconds to answer, like a real network call.
struct SlowCheckout;

#[async_trait::async_trait]
impl CheckoutProvider for SlowCheckout {
    async fn create_session(
        &self,
        _request: &CheckoutRequest,
    ) -> Result<CheckoutSession, CheckoutCreationError> {
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        Ok(CheckoutSession {
            session_url: url::Url::parse("https://checkout.invalid/session/cs_slow_1")
                .map_err(|e| CheckoutCreationError::new(e.to_string()))?,
        })
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_checkout_does_not_block_other_sessions() {
    let state = Arc::new(AppState::new(
        test_config(),
        Arc::new(SlowCheckout),
        Arc::new(CannedGenerator::new(CANNED_PLAN)),
    ));
    let app = build_app(state);

    let sid_a = open_session(&app).await;
    let sid_b = open_session(&app).await;

    // Session A starts a checkout; the provider call runs for 5 s.
    send(&app, "POST", "/api/unlock/request", Some(&sid_a), None).await;
    let app_a = app.clone();
    let sid_a_task = sid_a.clone();
    let confirm = tokio::spawn(async move {
        send(&app_a, "POST", "/api/unlock/confirm", Some(&sid_a_task), None).await
    });
    // Let the confirm task reach the provider call and take A's session lock.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    // Session B's status query must answer while A's checkout is in flight.
    let b = tokio::time::timeout(
        std::time::Duration::from_secs(1),
        send(&app, "GET", "/api/unlock", Some(&sid_b), None),
    )
    .await;
    let response = match b {
        Ok(response) => response,
        Err(_) => panic!("session B's status query waited behind session A's checkout call"),
    };
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["phase"], "idle");

    // A's checkout still completes normally.
    let response = confirm.await.expect("confirm task");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["phase"], "confirmed");
}

#[tokio::test]
async fn test_reloading_the_success_redirect_is_harmless() {
    let app = test_app();
    let sid = open_session(&app).await;

    send(&app, "POST", "/api/unlock/request", Some(&sid), None).await;
    send(&app, "POST", "/api/unlock/confirm", Some(&sid), None).await;
    send(
        &app,
        "GET",
        "/api/unlock/complete?payment=success",
        Some(&sid),
        None,
    )
    .await;

    // The browser reloads the redirect URL; the gate stays unlocked and the
    // marker is not treated as a forgery for this session.
    let response = send(
        &app,
        "GET",
        "/api/unlock/complete?payment=success",
        Some(&sid),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["unlocked"], true);
}
