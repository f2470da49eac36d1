//! Instructor Handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{
    CreateInstructorRequest, ListQueryParams, UpdateInstructorRequest,
};
use crate::application::dto::response::InstructorDto;
use crate::application::services::UserService;
use crate::presentation::http::extractors::{EntityId, ValidatedJson};
use crate::shared::error::AppError;
use crate::startup::AppState;

pub async fn list_instructors(
    State(state): State<AppState>,
    Query(params): Query<ListQueryParams>,
) -> Result<Json<Vec<InstructorDto>>, AppError> {
    let service = state.registry.begin_scope()?.user_service()?;
    Ok(Json(service.list_instructors(params.active_only).await?))
}

pub async fn get_instructor(
    State(state): State<AppState>,
    EntityId(instructor_id): EntityId,
) -> Result<Json<InstructorDto>, AppError> {
    let service = state.registry.begin_scope()?.user_service()?;
    Ok(Json(service.get_instructor(instructor_id).await?))
}

pub async fn create_instructor(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateInstructorRequest>,
) -> Result<(StatusCode, Json<InstructorDto>), AppError> {
    let service = state.registry.begin_scope()?.user_service()?;
    let instructor = service.create_instructor(body).await?;

    Ok((StatusCode::CREATED, Json(instructor)))
}

pub async fn update_instructor(
    State(state): State<AppState>,
    EntityId(instructor_id): EntityId,
    ValidatedJson(body): ValidatedJson<UpdateInstructorRequest>,
) -> Result<Json<InstructorDto>, AppError> {
    let service = state.registry.begin_scope()?.user_service()?;
    Ok(Json(service.update_instructor(instructor_id, body).await?))
}

pub async fn delete_instructor(
    State(state): State<AppState>,
    EntityId(instructor_id): EntityId,
) -> Result<StatusCode, AppError> {
    let service = state.registry.begin_scope()?.user_service()?;
    service.delete_instructor(instructor_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
