//! Payment Handlers

use axum::{extract::State, http::StatusCode, Json};

use crate::application::dto::request::{CreatePaymentRequest, UpdatePaymentRequest};
use crate::application::dto::response::PaymentDto;
use crate::application::services::PaymentService;
use crate::presentation::http::extractors::{EntityId, ValidatedJson};
use crate::shared::error::AppError;
use crate::startup::AppState;

pub async fn create_payment(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<PaymentDto>), AppError> {
    let service = state.registry.begin_scope()?.payment_service()?;
    let payment = service.create_payment(body).await?;

    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn purchase_payments(
    State(state): State<AppState>,
    EntityId(purchase_id): EntityId,
) -> Result<Json<Vec<PaymentDto>>, AppError> {
    let service = state.registry.begin_scope()?.payment_service()?;
    Ok(Json(service.list_by_purchase(purchase_id).await?))
}

/// Change a payment's status (e.g. pending to completed)
pub async fn update_payment(
    State(state): State<AppState>,
    EntityId(payment_id): EntityId,
    ValidatedJson(body): ValidatedJson<UpdatePaymentRequest>,
) -> Result<Json<PaymentDto>, AppError> {
    let service = state.registry.begin_scope()?.payment_service()?;
    Ok(Json(service.update_payment(payment_id, body).await?))
}
