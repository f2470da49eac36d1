//! User Account Handlers (administration)

use axum::{extract::State, http::StatusCode, Json};

use crate::application::dto::request::{CreateUserRequest, UpdateUserRequest};
use crate::application::dto::response::UserInfoDto;
use crate::application::services::UserService;
use crate::presentation::http::extractors::{EntityId, ValidatedJson};
use crate::shared::error::AppError;
use crate::startup::AppState;

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserInfoDto>>, AppError> {
    let service = state.registry.begin_scope()?.user_service()?;
    Ok(Json(service.list_users().await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    EntityId(user_id): EntityId,
) -> Result<Json<UserInfoDto>, AppError> {
    let service = state.registry.begin_scope()?.user_service()?;
    Ok(Json(service.get_user(user_id).await?))
}

/// Create an account with an explicit role
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserInfoDto>), AppError> {
    let service = state.registry.begin_scope()?.user_service()?;
    let user = service.create_user(body).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    EntityId(user_id): EntityId,
    ValidatedJson(body): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserInfoDto>, AppError> {
    let service = state.registry.begin_scope()?.user_service()?;
    Ok(Json(service.update_user(user_id, body).await?))
}
