//! Class Schedule Handlers
//!
//! `GET /classes` accepts `from`, `to`, `instructor_id`, `zone_id` and
//! `status` query parameters; all are optional.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{ClassQueryParams, CreateClassRequest, UpdateClassRequest};
use crate::application::dto::response::ClassDto;
use crate::application::mapping::class_filter;
use crate::application::services::ClassService;
use crate::presentation::http::extractors::{EntityId, ValidatedJson};
use crate::shared::error::AppError;
use crate::startup::AppState;

pub async fn list_classes(
    State(state): State<AppState>,
    Query(params): Query<ClassQueryParams>,
) -> Result<Json<Vec<ClassDto>>, AppError> {
    let service = state.registry.begin_scope()?.class_service()?;
    Ok(Json(service.list_classes(class_filter(params)).await?))
}

pub async fn get_class(
    State(state): State<AppState>,
    EntityId(class_id): EntityId,
) -> Result<Json<ClassDto>, AppError> {
    let service = state.registry.begin_scope()?.class_service()?;
    Ok(Json(service.get_class(class_id).await?))
}

pub async fn create_class(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateClassRequest>,
) -> Result<(StatusCode, Json<ClassDto>), AppError> {
    let service = state.registry.begin_scope()?.class_service()?;
    let class = service.create_class(body).await?;

    Ok((StatusCode::CREATED, Json(class)))
}

pub async fn update_class(
    State(state): State<AppState>,
    EntityId(class_id): EntityId,
    ValidatedJson(body): ValidatedJson<UpdateClassRequest>,
) -> Result<Json<ClassDto>, AppError> {
    let service = state.registry.begin_scope()?.class_service()?;
    Ok(Json(service.update_class(class_id, body).await?))
}

/// Cancel a class; confirmed enrollments are released with it.
pub async fn cancel_class(
    State(state): State<AppState>,
    EntityId(class_id): EntityId,
) -> Result<Json<ClassDto>, AppError> {
    let service = state.registry.begin_scope()?.class_service()?;
    Ok(Json(service.cancel_class(class_id).await?))
}
