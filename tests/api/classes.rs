//! Zone and Class Schedule API Tests

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{body_json, unique_email, TestApp};

#[tokio::test]
async fn test_create_class_reports_names_and_spots() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let zone = app.create_zone(&admin, Some(12)).await;
    let instructor = app.create_instructor(&admin).await;

    let class = app.create_class(&admin, &instructor, &zone, 10).await;

    assert_eq!(class["instructor_name"], "Lucia Ramos");
    assert_eq!(class["zone_name"], "Sala Reformer");
    assert_eq!(class["duration_minutes"], 55);
    assert_eq!(class["capacity_limit"], 10);
    assert_eq!(class["reserved_spots"], 0);
    assert_eq!(class["available_spots"], 10);
    assert_eq!(class["status"], "scheduled");
}

#[tokio::test]
async fn test_available_spots_count_only_confirmed_enrollments() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let zone = app.create_zone(&admin, None).await;
    let instructor = app.create_instructor(&admin).await;
    let class = app.create_class(&admin, &instructor, &zone, 10).await;

    for name in ["Eva", "Marta", "Sofia"] {
        let student = app.create_student(&admin, name).await;
        let response = app.enroll(&admin, &student, &class).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // A cancelled enrollment frees its spot
    let dropout = app.create_student(&admin, "Paula").await;
    let enrollment = body_json(app.enroll(&admin, &dropout, &class).await).await;
    let cancel_uri = format!("/api/v1/enrollments/{}/cancel", enrollment["id"].as_str().unwrap());
    let response = app.post_json_auth(&cancel_uri, json!({}), &admin).await;
    assert_eq!(response.status(), StatusCode::OK);

    let uri = format!("/api/v1/classes/{}", class["id"].as_str().unwrap());
    let body = body_json(app.get_auth(&uri, &admin).await).await;

    assert_eq!(body["reserved_spots"], 3);
    assert_eq!(body["available_spots"], 7);
}

#[tokio::test]
async fn test_create_class_validation_messages() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let start = Utc::now() + Duration::days(1);

    let response = app
        .post_json_auth(
            "/api/v1/classes",
            json!({
                "name": "",
                "instructor_id": "1",
                "zone_id": "2",
                "start_time": start,
                "end_time": start + Duration::minutes(30),
                "capacity_limit": 0,
            }),
            &admin,
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    let messages: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["message"].as_str().unwrap())
        .collect();
    assert_eq!(
        messages,
        vec![
            "La capacidad debe estar entre 1 y 100",
            "El nombre de la clase es requerido (máximo 100 caracteres)",
        ]
    );
}

#[tokio::test]
async fn test_create_class_rejects_inverted_time_range() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let start = Utc::now() + Duration::days(1);

    let response = app
        .post_json_auth(
            "/api/v1/classes",
            json!({
                "name": "Pilates Mat",
                "instructor_id": "1",
                "zone_id": "2",
                "start_time": start,
                "end_time": start - Duration::minutes(30),
                "capacity_limit": 8,
            }),
            &admin,
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["errors"][0]["message"],
        "La hora de fin debe ser posterior a la hora de inicio"
    );
}

#[tokio::test]
async fn test_class_cannot_exceed_zone_capacity() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let zone = app.create_zone(&admin, Some(5)).await;
    let instructor = app.create_instructor(&admin).await;
    let start = Utc::now() + Duration::days(2);

    let response = app
        .post_json_auth(
            "/api/v1/classes",
            json!({
                "name": "Reformer avanzado",
                "instructor_id": instructor["id"],
                "zone_id": zone["id"],
                "start_time": start,
                "end_time": start + Duration::hours(1),
                "capacity_limit": 8,
            }),
            &admin,
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_class_with_unknown_zone_is_not_found() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let instructor = app.create_instructor(&admin).await;
    let start = Utc::now() + Duration::days(1);

    let response = app
        .post_json_auth(
            "/api/v1/classes",
            json!({
                "name": "Pilates Mat",
                "instructor_id": instructor["id"],
                "zone_id": "999",
                "start_time": start,
                "end_time": start + Duration::hours(1),
                "capacity_limit": 8,
            }),
            &admin,
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_classes_filters_by_instructor() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let zone = app.create_zone(&admin, None).await;
    let lucia = app.create_instructor(&admin).await;
    let other = app.create_instructor(&admin).await;
    app.create_class(&admin, &lucia, &zone, 6).await;
    app.create_class(&admin, &other, &zone, 6).await;

    let (student_token, _) = app.register_student(&unique_email()).await;
    let uri = format!(
        "/api/v1/classes?instructor_id={}",
        lucia["id"].as_str().unwrap()
    );
    let response = app.get_auth(&uri, &student_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let classes = body.as_array().unwrap();
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0]["instructor_id"], lucia["id"]);
}

#[tokio::test]
async fn test_student_cannot_schedule_classes() {
    let app = TestApp::new().await;
    let (token, _) = app.register_student(&unique_email()).await;

    let response = app
        .post_json_auth("/api/v1/classes", json!({ "name": "x" }), &token)
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_cancel_class_releases_enrollments() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let zone = app.create_zone(&admin, None).await;
    let instructor = app.create_instructor(&admin).await;
    let class = app.create_class(&admin, &instructor, &zone, 4).await;
    let student = app.create_student(&admin, "Eva").await;
    app.enroll(&admin, &student, &class).await;

    let class_id = class["id"].as_str().unwrap();
    let response = app
        .post_json_auth(&format!("/api/v1/classes/{}/cancel", class_id), json!({}), &admin)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "cancelled");

    let enrollments = body_json(
        app.get_auth(&format!("/api/v1/enrollments/class/{}", class_id), &admin)
            .await,
    )
    .await;
    assert_eq!(enrollments[0]["status"], "cancelled");
}

#[tokio::test]
async fn test_zone_in_use_cannot_be_deleted() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let zone = app.create_zone(&admin, None).await;
    let instructor = app.create_instructor(&admin).await;
    app.create_class(&admin, &instructor, &zone, 4).await;

    let uri = format!("/api/v1/zones/{}", zone["id"].as_str().unwrap());
    let response = app
        .request(axum::http::Method::DELETE, &uri, None, Some(&admin))
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_cancel_class_returns_purchase_credit() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;
    let zone = app.create_zone(&admin, None).await;
    let instructor = app.create_instructor(&admin).await;
    let class = app.create_class(&admin, &instructor, &zone, 4).await;
    let student = app.create_student(&admin, "Eva").await;
    let purchase = app.create_purchase(&admin, &student, 8).await;
    app.create(
        "/api/v1/enrollments",
        json!({
            "student_id": student["id"],
            "class_id": class["id"],
            "purchase_id": purchase["id"],
        }),
        &admin,
    )
    .await;

    let purchase_uri = format!("/api/v1/purchases/{}", purchase["id"].as_str().unwrap());
    let before = body_json(app.get_auth(&purchase_uri, &admin).await).await;
    assert_eq!(before["remaining_classes"], 7);

    let cancel_uri = format!("/api/v1/classes/{}/cancel", class["id"].as_str().unwrap());
    let response = app.post_json_auth(&cancel_uri, json!({}), &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cancelled = body_json(response).await;
    assert_eq!(cancelled["reserved_spots"], 0);

    let after = body_json(app.get_auth(&purchase_uri, &admin).await).await;
    assert_eq!(after["remaining_classes"], 8);

    let again = app.post_json_auth(&cancel_uri, json!({}), &admin).await;
    assert_eq!(again.status(), StatusCode::CONFLICT);
}
