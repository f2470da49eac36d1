//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use std::path::PathBuf;

use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use studio_api::application::dto::request::CreateUserRequest;
use studio_api::application::services::UserService;
use studio_api::config::{
    CacheBackend, CacheSettings, CorsSettings, DatabaseSettings, JwtSettings, ServerSettings,
    Settings, SnowflakeSettings,
};
use studio_api::domain::Role;
use studio_api::infrastructure::cache::{CacheStore, MemoryCache};
use studio_api::infrastructure::database;
use studio_api::shared::snowflake::DEFAULT_EPOCH_MS;
use studio_api::startup::{build_router, AppState};

pub const TEST_PASSWORD: &str = "Password123!";

/// Settings for an isolated in-memory instance
pub fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseSettings {
            url: "sqlite::memory:".into(),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: 5,
            run_migrations: true,
        },
        cache: CacheSettings {
            backend: CacheBackend::Memory,
            redis_url: None,
            health_ttl_seconds: 10,
        },
        jwt: JwtSettings {
            secret: "integration-test-secret-0123456789abcdef".into(),
            access_token_expiry_minutes: 60,
        },
        snowflake: SnowflakeSettings {
            machine_id: 7,
            epoch: DEFAULT_EPOCH_MS,
        },
        cors: CorsSettings {
            allowed_origins: vec![],
        },
        environment: "test".into(),
    }
}

/// Test application over SQLite and the in-memory cache
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    db_file: Option<PathBuf>,
}

impl TestApp {
    /// In-memory database on a single connection
    pub async fn new() -> Self {
        Self::with_settings(test_settings(), None).await
    }

    /// Database file in the temp dir with a pool of `connections`, so
    /// requests run on separate connections at the same time.
    pub async fn file_backed(connections: u32) -> Self {
        let path = std::env::temp_dir().join(format!("studio_test_{}.db", uuid::Uuid::new_v4()));

        let mut settings = test_settings();
        settings.database.url = format!("sqlite://{}?mode=rwc", path.display());
        settings.database.max_connections = connections;

        Self::with_settings(settings, Some(path)).await
    }

    async fn with_settings(settings: Settings, db_file: Option<PathBuf>) -> Self {
        let db = database::create_pool(&settings.database)
            .await
            .expect("test pool");
        database::run_migrations(&db).await.expect("migrations");

        let state = AppState::new(db, CacheStore::Memory(MemoryCache::new()), settings);
        let router = build_router(state.clone());

        Self {
            router,
            state,
            db_file,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        let body = match body {
            Some(value) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn get_auth(&self, uri: &str, token: &str) -> Response {
        self.request(Method::GET, uri, None, Some(token)).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response {
        self.request(Method::POST, uri, Some(body), None).await
    }

    pub async fn post_json_auth(&self, uri: &str, body: Value, token: &str) -> Response {
        self.request(Method::POST, uri, Some(body), Some(token)).await
    }

    pub async fn patch_json_auth(&self, uri: &str, body: Value, token: &str) -> Response {
        self.request(Method::PATCH, uri, Some(body), Some(token)).await
    }

    pub async fn put_json_auth(&self, uri: &str, body: Value, token: &str) -> Response {
        self.request(Method::PUT, uri, Some(body), Some(token)).await
    }

    pub async fn delete_auth(&self, uri: &str, token: &str) -> Response {
        self.request(Method::DELETE, uri, None, Some(token)).await
    }

    /// Register a student through the public endpoint and return its token
    pub async fn register_student(&self, email: &str) -> (String, Value) {
        let response = self
            .post_json(
                "/api/v1/auth/register",
                json!({
                    "email": email,
                    "password": TEST_PASSWORD,
                    "first_name": "Ana",
                    "last_name": "Diaz",
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        let token = body["access_token"].as_str().unwrap().to_string();
        (token, body["user"].clone())
    }

    /// Seed an account with the given role and log in as it
    pub async fn login_as(&self, role: Role) -> String {
        let email = unique_email();
        let service = self
            .state
            .registry
            .begin_scope()
            .unwrap()
            .user_service()
            .unwrap();
        service
            .create_user(CreateUserRequest {
                email: email.clone(),
                password: TEST_PASSWORD.into(),
                first_name: "Staff".into(),
                last_name: role.as_str().into(),
                role,
            })
            .await
            .unwrap();

        let response = self
            .post_json(
                "/api/v1/auth/login",
                json!({ "email": email, "password": TEST_PASSWORD }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        body_json(response).await["access_token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login_as(Role::Admin).await
    }

    /// POST expecting `201 Created`; returns the created body
    pub async fn create(&self, uri: &str, body: Value, token: &str) -> Value {
        let response = self.post_json_auth(uri, body, token).await;
        assert_eq!(response.status(), StatusCode::CREATED, "POST {}", uri);
        body_json(response).await
    }

    pub async fn create_zone(&self, token: &str, capacity: Option<i32>) -> Value {
        self.create(
            "/api/v1/zones",
            json!({ "name": "Sala Reformer", "capacity": capacity }),
            token,
        )
        .await
    }

    pub async fn create_instructor(&self, token: &str) -> Value {
        self.create(
            "/api/v1/instructors",
            json!({ "first_name": "Lucia", "last_name": "Ramos", "specialty": "Reformer" }),
            token,
        )
        .await
    }

    pub async fn create_student(&self, token: &str, first_name: &str) -> Value {
        self.create(
            "/api/v1/students",
            json!({ "first_name": first_name, "last_name": "Lopez" }),
            token,
        )
        .await
    }

    /// A class starting tomorrow, 55 minutes long
    pub async fn create_class(
        &self,
        token: &str,
        instructor: &Value,
        zone: &Value,
        capacity_limit: i32,
    ) -> Value {
        let start = Utc::now() + Duration::days(1);
        self.create(
            "/api/v1/classes",
            json!({
                "name": "Pilates Mat",
                "instructor_id": instructor["id"],
                "zone_id": zone["id"],
                "start_time": start,
                "end_time": start + Duration::minutes(55),
                "capacity_limit": capacity_limit,
            }),
            token,
        )
        .await
    }

    /// A package of `class_count` classes bought for `student`
    pub async fn create_purchase(&self, token: &str, student: &Value, class_count: i32) -> Value {
        let package = self
            .create(
                "/api/v1/packages",
                json!({
                    "name": format!("Bono {}", class_count),
                    "class_count": class_count,
                    "validity_days": 30,
                    "price": 96.0,
                }),
                token,
            )
            .await;
        self.create(
            "/api/v1/purchases",
            json!({ "student_id": student["id"], "package_id": package["id"] }),
            token,
        )
        .await
    }

    pub async fn enroll(&self, token: &str, student: &Value, class: &Value) -> Response {
        self.post_json_auth(
            "/api/v1/enrollments",
            json!({ "student_id": student["id"], "class_id": class["id"] }),
            token,
        )
        .await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(path) = &self.db_file {
            for suffix in ["", "-wal", "-shm", "-journal"] {
                let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
            }
        }
    }
}

/// Read a response body as JSON
pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Generate a unique test email
pub fn unique_email() -> String {
    format!("test_{}@example.com", uuid::Uuid::new_v4())
}
