//! Health Endpoint Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{body_json, TestApp};

#[tokio::test]
async fn test_liveness_reports_alive() {
    let app = TestApp::new().await;

    let response = app.get("/health/live").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "alive" }));
}

#[tokio::test]
async fn test_health_report_is_healthy_with_all_checks() {
    let app = TestApp::new().await;

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["database"]["status"], "healthy");
    assert_eq!(body["checks"]["cache"]["status"], "healthy");
    assert_eq!(body["checks"]["services"]["status"], "healthy");
    assert_eq!(body["checks"]["services"]["data"]["services_checked"], 5);
    assert_eq!(body["data"]["environment"], "test");
    assert!(body["data"]["process_id"].as_u64().is_some());
}

#[tokio::test]
async fn test_readiness_ok_when_healthy() {
    let app = TestApp::new().await;

    let response = app.get("/health/ready").await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_unavailable_after_pool_closed() {
    let app = TestApp::new().await;
    app.state.db.close().await;

    let response = app.get("/health/ready").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = body_json(response).await;
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["checks"]["database"]["status"], "unhealthy");
    assert!(body["checks"]["database"]["data"]["error"].is_string());
}

#[tokio::test]
async fn test_health_always_answers_ok() {
    let app = TestApp::new().await;
    app.state.db.close().await;

    let response = app.get("/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "unhealthy");
}
