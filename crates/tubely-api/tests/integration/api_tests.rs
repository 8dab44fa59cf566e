//! Health, readiness and middleware tests.

use axum::body::Body;
use axum::http::{Request, StatusCode};

use super::common::*;

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::spawn(TestOptions::default());

    let response = app.send(get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "healthy");
}

#[tokio::test]
async fn test_ready_endpoint() {
    let app = TestApp::spawn(TestOptions::default());

    let response = app.send(get("/ready")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ready");
    assert_eq!(json["checks"]["storage"]["status"], "ok");
}

#[tokio::test]
async fn test_metrics_route_absent_when_disabled() {
    let app = TestApp::spawn(TestOptions::default());
    assert_eq!(app.send(get("/metrics")).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_security_headers_and_request_id() {
    let app = TestApp::spawn(TestOptions::default());

    let response = app.send(get("/health")).await;
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("x-request-id"));

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-me-123")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.headers()["x-request-id"], "trace-me-123");
}
