//! Enrollment, Package and Attendance API Tests

use std::sync::Arc;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{body_json, unique_email, TestApp};

struct Schedule {
    admin: String,
    class: Value,
}

async fn schedule(app: &TestApp, capacity: i32) -> Schedule {
    let admin = app.admin_token().await;
    let zone = app.create_zone(&admin, None).await;
    let instructor = app.create_instructor(&admin).await;
    let class = app.create_class(&admin, &instructor, &zone, capacity).await;
    Schedule { admin, class }
}

#[tokio::test]
async fn test_student_enrolls_themselves() {
    let app = TestApp::new().await;
    let s = schedule(&app, 5).await;
    let (token, user) = app.register_student(&unique_email()).await;
    let student = json!({ "id": user["student_id"] });

    let response = app.enroll(&token, &student, &s.class).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "confirmed");
    assert_eq!(body["student_name"], "Ana Diaz");
    assert_eq!(body["class_name"], "Pilates Mat");
}

#[tokio::test]
async fn test_student_cannot_enroll_someone_else() {
    let app = TestApp::new().await;
    let s = schedule(&app, 5).await;
    let other = app.create_student(&s.admin, "Eva").await;
    let (token, _) = app.register_student(&unique_email()).await;

    let response = app.enroll(&token, &other, &s.class).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_duplicate_enrollment_conflicts() {
    let app = TestApp::new().await;
    let s = schedule(&app, 5).await;
    let student = app.create_student(&s.admin, "Eva").await;
    app.enroll(&s.admin, &student, &s.class).await;

    let response = app.enroll(&s.admin, &student, &s.class).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_full_class_rejects_enrollment() {
    let app = TestApp::new().await;
    let s = schedule(&app, 1).await;
    let first = app.create_student(&s.admin, "Eva").await;
    let second = app.create_student(&s.admin, "Marta").await;
    app.enroll(&s.admin, &first, &s.class).await;

    let response = app.enroll(&s.admin, &second, &s.class).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["message"], "La clase está completa");
}

#[tokio::test]
async fn test_enrollment_with_purchase_consumes_and_returns_credit() {
    let app = TestApp::new().await;
    let s = schedule(&app, 5).await;
    let student = app.create_student(&s.admin, "Eva").await;
    let package = app
        .create(
            "/api/v1/packages",
            json!({ "name": "Bono 8", "class_count": 8, "validity_days": 30, "price": 96.0 }),
            &s.admin,
        )
        .await;
    let purchase = app
        .create(
            "/api/v1/purchases",
            json!({ "student_id": student["id"], "package_id": package["id"] }),
            &s.admin,
        )
        .await;
    assert_eq!(purchase["remaining_classes"], 8);

    let enrollment = app
        .create(
            "/api/v1/enrollments",
            json!({
                "student_id": student["id"],
                "class_id": s.class["id"],
                "purchase_id": purchase["id"],
            }),
            &s.admin,
        )
        .await;

    let purchase_uri = format!("/api/v1/purchases/{}", purchase["id"].as_str().unwrap());
    let after_enroll = body_json(app.get_auth(&purchase_uri, &s.admin).await).await;
    assert_eq!(after_enroll["remaining_classes"], 7);

    let cancel_uri = format!("/api/v1/enrollments/{}/cancel", enrollment["id"].as_str().unwrap());
    app.post_json_auth(&cancel_uri, json!({}), &s.admin).await;

    let after_cancel = body_json(app.get_auth(&purchase_uri, &s.admin).await).await;
    assert_eq!(after_cancel["remaining_classes"], 8);
}

#[tokio::test]
async fn test_attendance_completes_enrollment() {
    let app = TestApp::new().await;
    let s = schedule(&app, 5).await;
    let student = app.create_student(&s.admin, "Eva").await;
    let enrollment = body_json(app.enroll(&s.admin, &student, &s.class).await).await;

    let attendance = app
        .create(
            "/api/v1/attendance",
            json!({ "student_id": student["id"], "class_id": s.class["id"] }),
            &s.admin,
        )
        .await;
    assert_eq!(attendance["student_id"], student["id"]);

    let class_id = s.class["id"].as_str().unwrap();
    let enrollments = body_json(
        app.get_auth(&format!("/api/v1/enrollments/class/{}", class_id), &s.admin)
            .await,
    )
    .await;
    assert_eq!(enrollments[0]["id"], enrollment["id"]);
    assert_eq!(enrollments[0]["status"], "completed");

    let duplicate = app
        .post_json_auth(
            "/api/v1/attendance",
            json!({ "student_id": student["id"], "class_id": s.class["id"] }),
            &s.admin,
        )
        .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_student_sees_only_own_enrollments() {
    let app = TestApp::new().await;
    let s = schedule(&app, 5).await;
    let other = app.create_student(&s.admin, "Eva").await;
    let (token, user) = app.register_student(&unique_email()).await;

    let own = format!(
        "/api/v1/enrollments/student/{}",
        user["student_id"].as_str().unwrap()
    );
    assert_eq!(app.get_auth(&own, &token).await.status(), StatusCode::OK);

    let foreign = format!(
        "/api/v1/enrollments/student/{}",
        other["id"].as_str().unwrap()
    );
    assert_eq!(
        app.get_auth(&foreign, &token).await.status(),
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_malformed_path_id_is_bad_request() {
    let app = TestApp::new().await;
    let admin = app.admin_token().await;

    let response = app.get_auth("/api/v1/classes/not-a-number", &admin).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_enrollments_never_exceed_capacity() {
    let app = Arc::new(TestApp::file_backed(8).await);
    let s = schedule(&app, 1).await;

    let mut students = Vec::new();
    for name in ["Ana", "Bea", "Carla", "Dora", "Elsa", "Flor"] {
        students.push(app.create_student(&s.admin, name).await);
    }

    let handles: Vec<_> = students
        .into_iter()
        .map(|student| {
            let app = app.clone();
            let admin = s.admin.clone();
            let class = s.class.clone();
            tokio::spawn(async move { app.enroll(&admin, &student, &class).await.status() })
        })
        .collect();

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap());
    }

    let created = statuses.iter().filter(|s| **s == StatusCode::CREATED).count();
    assert_eq!(created, 1, "statuses: {:?}", statuses);
    assert!(statuses
        .iter()
        .all(|s| *s == StatusCode::CREATED || *s == StatusCode::CONFLICT));

    let uri = format!("/api/v1/classes/{}", s.class["id"].as_str().unwrap());
    let class = body_json(app.get_auth(&uri, &s.admin).await).await;
    assert_eq!(class["reserved_spots"], 1);
    assert_eq!(class["available_spots"], 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_enrollments_take_each_credit_once() {
    let app = Arc::new(TestApp::file_backed(8).await);
    let admin = app.admin_token().await;
    let zone = app.create_zone(&admin, None).await;
    let instructor = app.create_instructor(&admin).await;
    let student = app.create_student(&admin, "Eva").await;
    let purchase = app.create_purchase(&admin, &student, 1).await;

    let mut classes = Vec::new();
    for _ in 0..4 {
        classes.push(app.create_class(&admin, &instructor, &zone, 5).await);
    }

    let handles: Vec<_> = classes
        .into_iter()
        .map(|class| {
            let app = app.clone();
            let admin = admin.clone();
            let body = json!({
                "student_id": student["id"],
                "class_id": class["id"],
                "purchase_id": purchase["id"],
            });
            tokio::spawn(async move {
                app.post_json_auth("/api/v1/enrollments", body, &admin)
                    .await
                    .status()
            })
        })
        .collect();

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap());
    }

    let created = statuses.iter().filter(|s| **s == StatusCode::CREATED).count();
    assert_eq!(created, 1, "statuses: {:?}", statuses);
    assert!(statuses
        .iter()
        .all(|s| *s == StatusCode::CREATED || *s == StatusCode::UNPROCESSABLE_ENTITY));

    let uri = format!("/api/v1/purchases/{}", purchase["id"].as_str().unwrap());
    let purchase = body_json(app.get_auth(&uri, &admin).await).await;
    assert_eq!(purchase["remaining_classes"], 0);
}

#[tokio::test]
async fn test_cancelled_enrollment_cannot_be_cancelled_again() {
    let app = TestApp::new().await;
    let s = schedule(&app, 5).await;
    let student = app.create_student(&s.admin, "Eva").await;
    let purchase = app.create_purchase(&s.admin, &student, 8).await;
    let enrollment = app
        .create(
            "/api/v1/enrollments",
            json!({
                "student_id": student["id"],
                "class_id": s.class["id"],
                "purchase_id": purchase["id"],
            }),
            &s.admin,
        )
        .await;

    let cancel_uri = format!("/api/v1/enrollments/{}/cancel", enrollment["id"].as_str().unwrap());
    let first = app.post_json_auth(&cancel_uri, json!({}), &s.admin).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(body_json(first).await["status"], "cancelled");

    let second = app.post_json_auth(&cancel_uri, json!({}), &s.admin).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let purchase_uri = format!("/api/v1/purchases/{}", purchase["id"].as_str().unwrap());
    let purchase = body_json(app.get_auth(&purchase_uri, &s.admin).await).await;
    assert_eq!(purchase["remaining_classes"], 8);
}
