//! Payment Service
//!
//! Payments recorded against purchases. Status moves only along
//! `pending → completed | failed` and `completed → refunded`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::application::dto::request::{CreatePaymentRequest, UpdatePaymentRequest};
use crate::application::dto::response::PaymentDto;
use crate::application::mapping::{apply_payment_update, payment_from_create, payment_to_dto};
use crate::domain::{PaymentRepository, PaymentStatus, PurchaseRepository, PurchaseStatus};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

#[async_trait]
pub trait PaymentService: Send + Sync {
    async fn create_payment(&self, request: CreatePaymentRequest) -> Result<PaymentDto, PaymentError>;

    async fn list_by_purchase(&self, purchase_id: i64) -> Result<Vec<PaymentDto>, PaymentError>;

    async fn update_payment(
        &self,
        payment_id: i64,
        request: UpdatePaymentRequest,
    ) -> Result<PaymentDto, PaymentError>;
}

/// Payment service errors
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment not found")]
    PaymentNotFound,

    #[error("Purchase not found")]
    PurchaseNotFound,

    #[error("Purchase is cancelled")]
    PurchaseCancelled,

    #[error("Cannot move payment from {from} to {to}")]
    InvalidTransition { from: PaymentStatus, to: PaymentStatus },

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::PaymentNotFound => AppError::NotFound("Pago no encontrado".into()),
            PaymentError::PurchaseNotFound => AppError::NotFound("Compra no encontrada".into()),
            PaymentError::PurchaseCancelled => {
                AppError::Unprocessable("La compra está cancelada".into())
            }
            PaymentError::InvalidTransition { from, to } => AppError::Conflict(format!(
                "No se puede cambiar el pago de {} a {}",
                from, to
            )),
            PaymentError::Store(e) => e,
        }
    }
}

pub struct PaymentServiceImpl<Y, P>
where
    Y: PaymentRepository,
    P: PurchaseRepository,
{
    payment_repo: Arc<Y>,
    purchase_repo: Arc<P>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<Y, P> PaymentServiceImpl<Y, P>
where
    Y: PaymentRepository,
    P: PurchaseRepository,
{
    pub fn new(
        payment_repo: Arc<Y>,
        purchase_repo: Arc<P>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            payment_repo,
            purchase_repo,
            id_generator,
        }
    }
}

#[async_trait]
impl<Y, P> PaymentService for PaymentServiceImpl<Y, P>
where
    Y: PaymentRepository + 'static,
    P: PurchaseRepository + 'static,
{
    #[tracing::instrument(skip(self, request), fields(purchase_id = request.purchase_id))]
    async fn create_payment(&self, request: CreatePaymentRequest) -> Result<PaymentDto, PaymentError> {
        let purchase = self
            .purchase_repo
            .find_by_id(request.purchase_id)
            .await?
            .ok_or(PaymentError::PurchaseNotFound)?;
        if purchase.status == PurchaseStatus::Cancelled {
            return Err(PaymentError::PurchaseCancelled);
        }

        let payment = payment_from_create(request, self.id_generator.generate(), Utc::now());
        let payment = self.payment_repo.create(&payment).await?;

        tracing::info!(payment_id = payment.id, amount = payment.amount, method = %payment.method, "Payment registered");
        Ok(payment_to_dto(&payment))
    }

    async fn list_by_purchase(&self, purchase_id: i64) -> Result<Vec<PaymentDto>, PaymentError> {
        if self.purchase_repo.find_by_id(purchase_id).await?.is_none() {
            return Err(PaymentError::PurchaseNotFound);
        }

        let payments = self.payment_repo.list_by_purchase(purchase_id).await?;
        Ok(payments.iter().map(payment_to_dto).collect())
    }

    #[tracing::instrument(skip(self, request))]
    async fn update_payment(
        &self,
        payment_id: i64,
        request: UpdatePaymentRequest,
    ) -> Result<PaymentDto, PaymentError> {
        let mut payment = self
            .payment_repo
            .find_by_id(payment_id)
            .await?
            .ok_or(PaymentError::PaymentNotFound)?;

        if let Some(next) = request.status {
            if next != payment.status && !payment.status.can_transition_to(next) {
                return Err(PaymentError::InvalidTransition {
                    from: payment.status,
                    to: next,
                });
            }
        }

        let previous = payment.status;
        apply_payment_update(&mut payment, request, Utc::now());
        let payment = self.payment_repo.update(&payment).await?;

        if previous != payment.status {
            tracing::info!(payment_id, from = %previous, to = %payment.status, "Payment status changed");
        }
        Ok(payment_to_dto(&payment))
    }
}
