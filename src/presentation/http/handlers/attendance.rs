//! Attendance Handlers

use axum::{extract::State, http::StatusCode, Json};

use crate::application::dto::request::CreateAttendanceRequest;
use crate::application::dto::response::AttendanceDto;
use crate::application::services::EnrollmentService;
use crate::presentation::http::extractors::{CurrentActor, EntityId, ValidatedJson};
use crate::shared::error::AppError;
use crate::startup::AppState;

pub async fn record_attendance(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateAttendanceRequest>,
) -> Result<(StatusCode, Json<AttendanceDto>), AppError> {
    let service = state.registry.begin_scope()?.enrollment_service()?;
    let attendance = service.record_attendance(body).await?;

    Ok((StatusCode::CREATED, Json(attendance)))
}

pub async fn class_attendance(
    State(state): State<AppState>,
    EntityId(class_id): EntityId,
) -> Result<Json<Vec<AttendanceDto>>, AppError> {
    let service = state.registry.begin_scope()?.enrollment_service()?;
    Ok(Json(service.attendance_by_class(class_id).await?))
}

pub async fn student_attendance(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    EntityId(student_id): EntityId,
) -> Result<Json<Vec<AttendanceDto>>, AppError> {
    let service = state.registry.begin_scope()?.enrollment_service()?;
    Ok(Json(service.attendance_by_student(&actor, student_id).await?))
}
