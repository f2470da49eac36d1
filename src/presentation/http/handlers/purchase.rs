//! Package Purchase Handlers

use axum::{extract::State, http::StatusCode, Json};

use crate::application::dto::request::CreatePurchaseRequest;
use crate::application::dto::response::PurchaseDto;
use crate::application::services::PackageService;
use crate::presentation::http::extractors::{CurrentActor, EntityId, ValidatedJson};
use crate::shared::error::AppError;
use crate::startup::AppState;

pub async fn create_purchase(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ValidatedJson(body): ValidatedJson<CreatePurchaseRequest>,
) -> Result<(StatusCode, Json<PurchaseDto>), AppError> {
    let service = state.registry.begin_scope()?.package_service()?;
    let purchase = service.purchase(&actor, body).await?;

    Ok((StatusCode::CREATED, Json(purchase)))
}

pub async fn get_purchase(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    EntityId(purchase_id): EntityId,
) -> Result<Json<PurchaseDto>, AppError> {
    let service = state.registry.begin_scope()?.package_service()?;
    Ok(Json(service.get_purchase(&actor, purchase_id).await?))
}

pub async fn student_purchases(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    EntityId(student_id): EntityId,
) -> Result<Json<Vec<PurchaseDto>>, AppError> {
    let service = state.registry.begin_scope()?.package_service()?;
    Ok(Json(service.list_purchases(&actor, student_id).await?))
}

pub async fn cancel_purchase(
    State(state): State<AppState>,
    EntityId(purchase_id): EntityId,
) -> Result<Json<PurchaseDto>, AppError> {
    let service = state.registry.begin_scope()?.package_service()?;
    Ok(Json(service.cancel_purchase(purchase_id).await?))
}
