//! Student Profile API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{body_json, TestApp};

#[tokio::test]
async fn test_delete_unreferenced_student() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let student = app.create_student(&admin, "Eva").await;

    let uri = format!("/api/v1/students/{}", student["id"].as_str().unwrap());
    let response = app.delete_auth(&uri, &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert_eq!(app.get_auth(&uri, &admin).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_student_with_walk_in_attendance_cannot_be_deleted() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let zone = app.create_zone(&admin, None).await;
    let instructor = app.create_instructor(&admin).await;
    let class = app.create_class(&admin, &instructor, &zone, 4).await;
    let student = app.create_student(&admin, "Eva").await;

    app.create(
        "/api/v1/attendance",
        json!({ "student_id": student["id"], "class_id": class["id"] }),
        &admin,
    )
    .await;

    let uri = format!("/api/v1/students/{}", student["id"].as_str().unwrap());
    let response = app.delete_auth(&uri, &admin).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await["message"],
        "El registro tiene asistencias asociadas"
    );
    assert_eq!(app.get_auth(&uri, &admin).await.status(), StatusCode::OK);
}
