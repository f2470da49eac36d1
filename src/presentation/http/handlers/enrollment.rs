//! Enrollment Handlers

use axum::{extract::State, http::StatusCode, Json};

use crate::application::dto::request::CreateEnrollmentRequest;
use crate::application::dto::response::EnrollmentDto;
use crate::application::services::EnrollmentService;
use crate::presentation::http::extractors::{CurrentActor, EntityId, ValidatedJson};
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Reserve a spot in a class
pub async fn create_enrollment(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ValidatedJson(body): ValidatedJson<CreateEnrollmentRequest>,
) -> Result<(StatusCode, Json<EnrollmentDto>), AppError> {
    let service = state.registry.begin_scope()?.enrollment_service()?;
    let enrollment = service.enroll(&actor, body).await?;

    Ok((StatusCode::CREATED, Json(enrollment)))
}

pub async fn cancel_enrollment(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    EntityId(enrollment_id): EntityId,
) -> Result<Json<EnrollmentDto>, AppError> {
    let service = state.registry.begin_scope()?.enrollment_service()?;
    Ok(Json(service.cancel(&actor, enrollment_id).await?))
}

pub async fn complete_enrollment(
    State(state): State<AppState>,
    EntityId(enrollment_id): EntityId,
) -> Result<Json<EnrollmentDto>, AppError> {
    let service = state.registry.begin_scope()?.enrollment_service()?;
    Ok(Json(service.complete(enrollment_id).await?))
}

pub async fn class_enrollments(
    State(state): State<AppState>,
    EntityId(class_id): EntityId,
) -> Result<Json<Vec<EnrollmentDto>>, AppError> {
    let service = state.registry.begin_scope()?.enrollment_service()?;
    Ok(Json(service.list_by_class(class_id).await?))
}

pub async fn student_enrollments(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    EntityId(student_id): EntityId,
) -> Result<Json<Vec<EnrollmentDto>>, AppError> {
    let service = state.registry.begin_scope()?.enrollment_service()?;
    Ok(Json(service.list_by_student(&actor, student_id).await?))
}
