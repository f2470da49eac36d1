//! Class Package Handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{
    CreatePackageRequest, ListQueryParams, UpdatePackageRequest,
};
use crate::application::dto::response::PackageDto;
use crate::application::services::PackageService;
use crate::presentation::http::extractors::{EntityId, ValidatedJson};
use crate::shared::error::AppError;
use crate::startup::AppState;

pub async fn list_packages(
    State(state): State<AppState>,
    Query(params): Query<ListQueryParams>,
) -> Result<Json<Vec<PackageDto>>, AppError> {
    let service = state.registry.begin_scope()?.package_service()?;
    Ok(Json(service.list_packages(params.active_only).await?))
}

pub async fn get_package(
    State(state): State<AppState>,
    EntityId(package_id): EntityId,
) -> Result<Json<PackageDto>, AppError> {
    let service = state.registry.begin_scope()?.package_service()?;
    Ok(Json(service.get_package(package_id).await?))
}

pub async fn create_package(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreatePackageRequest>,
) -> Result<(StatusCode, Json<PackageDto>), AppError> {
    let service = state.registry.begin_scope()?.package_service()?;
    let package = service.create_package(body).await?;

    Ok((StatusCode::CREATED, Json(package)))
}

pub async fn update_package(
    State(state): State<AppState>,
    EntityId(package_id): EntityId,
    ValidatedJson(body): ValidatedJson<UpdatePackageRequest>,
) -> Result<Json<PackageDto>, AppError> {
    let service = state.registry.begin_scope()?.package_service()?;
    Ok(Json(service.update_package(package_id, body).await?))
}

/// Soft delete: the package stays readable but can no longer be bought.
pub async fn deactivate_package(
    State(state): State<AppState>,
    EntityId(package_id): EntityId,
) -> Result<Json<PackageDto>, AppError> {
    let service = state.registry.begin_scope()?.package_service()?;
    Ok(Json(service.deactivate_package(package_id).await?))
}
