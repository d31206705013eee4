mod common;

use common::TestApp;
use products_service::config::{ProductsConfig, StoreBackend};
use secrecy::Secret;

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/health/").await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "products-service");
    assert!(body["version"].is_string());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn health_check_without_trailing_slash() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/health").await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn liveness_check_works() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/health/live").await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "alive");
    assert_eq!(body["service"], "products-service");
}

#[tokio::test]
async fn readiness_check_with_reachable_store() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/health/ready").await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn readiness_check_reports_unreachable_store() {
    let mut config = ProductsConfig::for_memory_store();
    config.store = StoreBackend::Mongodb;
    // Nothing listens on port 1; test mode skips the startup ping.
    config.mongodb.uri = Secret::new(
        "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200&connectTimeoutMS=200".to_string(),
    );
    let app = TestApp::spawn_with(config).await;

    let (status, body) = app.get("/health/ready").await;

    assert_eq!(status, 503);
    assert_eq!(body["status"], "not ready");
    assert_eq!(body["database"], "disconnected");
    let error = body["error"].as_str().unwrap_or_default();
    assert!(!error.is_empty());
    assert!(!error.starts_with("store unavailable"));

    // Liveness does not depend on the store.
    let (status, _) = app.get("/health/live").await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn unknown_route_returns_enveloped_404() {
    let app = TestApp::spawn().await;

    let (status, body) = app.get("/nonexistent").await;

    assert_eq!(status, 404);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Route not found");
}

#[tokio::test]
async fn metrics_endpoint_returns_text() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/metrics"))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    let content_type = response
        .headers()
        .get("content-type")
        .expect("Missing content-type header")
        .to_str()
        .expect("Invalid content-type")
        .to_string();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/health/live"))
        .header("x-request-id", "req-42")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.headers()["x-request-id"], "req-42");
}
