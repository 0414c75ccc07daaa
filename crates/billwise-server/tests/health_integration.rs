use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use billwise_core::config::{Config, ProviderMode};
use billwise_server::app::build_app;
use billwise_server::providers::{CannedGenerator, MockCheckout};
use billwise_server::state::AppState;

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

async fn json_body(response: axum::http::Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse JSON")
}

#[tokio::test]
async fn test_health_returns_200() {
    let state = Arc::new(AppState::new(
        test_config(),
        Arc::new(MockCheckout::new()),
        Arc::new(CannedGenerator::default()),
    ));
    let app = build_app(state);

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build request");

    let response = app.oneshot(request).await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["sessions"], 0);
}

#[tokio::test]
async fn test_health_sets_session_cookie() {
    let state = Arc::new(AppState::new(
        test_config(),
        Arc::new(MockCheckout::new()),
        Arc::new(CannedGenerator::default()),
    ));
    let app = build_app(state);

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build request");

    let response = app.oneshot(request).await.expect("request");
    let cookie = response
        .headers()
        .get("set-cookie")
        .expect("set-cookie on first contact")
        .to_str()
        .expect("ascii cookie");
    assert!(cookie.starts_with("billwise_sid="));
    assert!(cookie.contains("HttpOnly"));
}
