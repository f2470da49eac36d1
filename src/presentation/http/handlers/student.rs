//! Student Handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{CreateStudentRequest, ListQueryParams, UpdateStudentRequest};
use crate::application::dto::response::StudentDto;
use crate::application::services::UserService;
use crate::presentation::http::extractors::{EntityId, ValidatedJson};
use crate::shared::error::AppError;
use crate::startup::AppState;

pub async fn list_students(
    State(state): State<AppState>,
    Query(params): Query<ListQueryParams>,
) -> Result<Json<Vec<StudentDto>>, AppError> {
    let service = state.registry.begin_scope()?.user_service()?;
    Ok(Json(service.list_students(params.active_only).await?))
}

pub async fn get_student(
    State(state): State<AppState>,
    EntityId(student_id): EntityId,
) -> Result<Json<StudentDto>, AppError> {
    let service = state.registry.begin_scope()?.user_service()?;
    Ok(Json(service.get_student(student_id).await?))
}

pub async fn create_student(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateStudentRequest>,
) -> Result<(StatusCode, Json<StudentDto>), AppError> {
    let service = state.registry.begin_scope()?.user_service()?;
    let student = service.create_student(body).await?;

    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn update_student(
    State(state): State<AppState>,
    EntityId(student_id): EntityId,
    ValidatedJson(body): ValidatedJson<UpdateStudentRequest>,
) -> Result<Json<StudentDto>, AppError> {
    let service = state.registry.begin_scope()?.user_service()?;
    Ok(Json(service.update_student(student_id, body).await?))
}

/// Delete a student without enrollments or purchases
pub async fn delete_student(
    State(state): State<AppState>,
    EntityId(student_id): EntityId,
) -> Result<StatusCode, AppError> {
    let service = state.registry.begin_scope()?.user_service()?;
    service.delete_student(student_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
