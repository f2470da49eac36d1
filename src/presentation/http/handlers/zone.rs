//! Studio Zone Handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{CreateZoneRequest, ListQueryParams, UpdateZoneRequest};
use crate::application::dto::response::ZoneDto;
use crate::application::services::ClassService;
use crate::presentation::http::extractors::{EntityId, ValidatedJson};
use crate::shared::error::AppError;
use crate::startup::AppState;

pub async fn list_zones(
    State(state): State<AppState>,
    Query(params): Query<ListQueryParams>,
) -> Result<Json<Vec<ZoneDto>>, AppError> {
    let service = state.registry.begin_scope()?.class_service()?;
    Ok(Json(service.list_zones(params.active_only).await?))
}

pub async fn get_zone(
    State(state): State<AppState>,
    EntityId(zone_id): EntityId,
) -> Result<Json<ZoneDto>, AppError> {
    let service = state.registry.begin_scope()?.class_service()?;
    Ok(Json(service.get_zone(zone_id).await?))
}

pub async fn create_zone(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateZoneRequest>,
) -> Result<(StatusCode, Json<ZoneDto>), AppError> {
    let service = state.registry.begin_scope()?.class_service()?;
    let zone = service.create_zone(body).await?;

    Ok((StatusCode::CREATED, Json(zone)))
}

pub async fn update_zone(
    State(state): State<AppState>,
    EntityId(zone_id): EntityId,
    ValidatedJson(body): ValidatedJson<UpdateZoneRequest>,
) -> Result<Json<ZoneDto>, AppError> {
    let service = state.registry.begin_scope()?.class_service()?;
    Ok(Json(service.update_zone(zone_id, body).await?))
}

pub async fn delete_zone(
    State(state): State<AppState>,
    EntityId(zone_id): EntityId,
) -> Result<StatusCode, AppError> {
    let service = state.registry.begin_scope()?.class_service()?;
    service.delete_zone(zone_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
