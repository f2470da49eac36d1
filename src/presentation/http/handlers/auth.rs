//! Authentication Handlers

use axum::{extract::State, http::StatusCode, Json};

use crate::application::dto::request::{LoginRequest, RegisterRequest};
use crate::application::dto::response::{AuthResponse, UserInfoDto};
use crate::application::services::AuthService;
use crate::presentation::http::extractors::{CurrentActor, ValidatedJson};
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Register a new student account
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let service = state.registry.begin_scope()?.auth_service()?;
    let response = service.register(body).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Login with credentials
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let service = state.registry.begin_scope()?.auth_service()?;
    Ok(Json(service.login(body).await?))
}

/// Current user
pub async fn me(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<UserInfoDto>, AppError> {
    let service = state.registry.begin_scope()?.auth_service()?;
    Ok(Json(service.me(actor.user_id).await?))
}
