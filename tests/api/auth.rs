//! Authentication API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{body_json, unique_email, TestApp, TEST_PASSWORD};

#[tokio::test]
async fn test_register_creates_student_account() {
    let app = TestApp::new().await;
    let email = unique_email();

    let (token, user) = app.register_student(&email).await;

    assert!(!token.is_empty());
    assert_eq!(user["email"], email.as_str());
    assert_eq!(user["role"], "student");
    assert_eq!(user["full_name"], "Ana Diaz");
    assert!(user["student_id"].is_string());
    assert!(user["instructor_id"].is_null());
}

#[tokio::test]
async fn test_register_with_invalid_email_fails() {
    let app = TestApp::new().await;

    let response = app
        .post_json(
            "/api/v1/auth/register",
            json!({
                "email": "not-an-email",
                "password": TEST_PASSWORD,
                "first_name": "Ana",
                "last_name": "Diaz",
            }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["errors"][0]["field"], "email");
    assert_eq!(body["errors"][0]["message"], "El correo electrónico no es válido");
}

#[tokio::test]
async fn test_register_with_malformed_json_fails() {
    let app = TestApp::new().await;

    let response = app
        .post_json("/api/v1/auth/register", json!({ "email": 42 }))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_with_duplicate_email_fails() {
    let app = TestApp::new().await;
    let email = unique_email();
    app.register_student(&email).await;

    let response = app
        .post_json(
            "/api/v1/auth/register",
            json!({
                "email": email,
                "password": TEST_PASSWORD,
                "first_name": "Otra",
                "last_name": "Persona",
            }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_with_invalid_credentials_fails() {
    let app = TestApp::new().await;
    let email = unique_email();
    app.register_student(&email).await;

    let response = app
        .post_json(
            "/api/v1/auth/login",
            json!({ "email": email, "password": "WrongPassword1!" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_current_user() {
    let app = TestApp::new().await;
    let email = unique_email();
    let (token, user) = app.register_student(&email).await;

    let response = app.get_auth("/api/v1/auth/me", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], user["id"]);
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = TestApp::new().await;

    let response = app.get("/api/v1/classes").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let app = TestApp::new().await;

    let response = app.get_auth("/api/v1/auth/me", "not.a.jwt").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_student_cannot_reach_admin_routes() {
    let app = TestApp::new().await;
    let (token, _) = app.register_student(&unique_email()).await;

    let response = app.get_auth("/api/v1/users", &token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_lists_users() {
    let app = TestApp::new().await;
    app.register_student(&unique_email()).await;
    let admin = app.admin_token().await;

    let response = app.get_auth("/api/v1/users", &admin).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_deactivated_account_loses_access_with_live_token() {
    let app = TestApp::new().await;
    let (token, user) = app.register_student(&unique_email()).await;
    let admin = app.admin_token().await;

    let uri = format!("/api/v1/users/{}", user["id"].as_str().unwrap());
    let response = app
        .put_json_auth(&uri, json!({ "is_active": false }), &admin)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get_auth("/api/v1/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["message"], "La cuenta está desactivada");
}

#[tokio::test]
async fn test_demoted_admin_loses_admin_routes() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let demoted = app.admin_token().await;
    assert_eq!(
        app.get_auth("/api/v1/users", &demoted).await.status(),
        StatusCode::OK
    );

    let me = body_json(app.get_auth("/api/v1/auth/me", &demoted).await).await;
    let uri = format!("/api/v1/users/{}", me["id"].as_str().unwrap());
    let response = app
        .put_json_auth(&uri, json!({ "role": "student" }), &admin)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        app.get_auth("/api/v1/users", &demoted).await.status(),
        StatusCode::FORBIDDEN
    );
}
