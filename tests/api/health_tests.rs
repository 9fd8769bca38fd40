//! Health Check API Tests

use axum::http::{header, StatusCode};
use pretty_assertions::assert_eq;

use crate::common::{body_json, TestApp};

#[tokio::test]
async fn test_health_check_returns_ok() {
    let app = TestApp::new();

    let response = app.get("/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_liveness_endpoint() {
    let app = TestApp::new();

    let response = app.get("/health/live", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "alive");
}

#[tokio::test]
async fn test_readiness_reports_store() {
    let app = TestApp::new();

    let response = app.get("/health/ready", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_ne!(body["checks"]["store"]["status"], "unhealthy");
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_metrics_endpoint_is_prometheus_text() {
    let app = TestApp::new();
    app.get("/health", None).await;

    let response = app.get("/metrics", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("portfolio_admin_http_requests_total"));
}
