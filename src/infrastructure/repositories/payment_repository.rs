//! Payment Repository Implementation

use async_trait::async_trait;
use sqlx::AnyPool;

use crate::domain::{Payment, PaymentMethod, PaymentRepository, PaymentStatus};
use crate::infrastructure::database::{format_timestamp, parse_opt_timestamp, parse_timestamp};
use crate::shared::error::AppError;

const PAYMENT_COLUMNS: &str = "id, purchase_id, amount, method, status, reference, notes, \
                               paid_at, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: i64,
    purchase_id: i64,
    amount: f64,
    method: String,
    status: String,
    reference: Option<String>,
    notes: Option<String>,
    paid_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = AppError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let method = PaymentMethod::parse(&row.method)
            .ok_or_else(|| AppError::Internal(format!("Unknown payment method '{}'", row.method)))?;
        let status = PaymentStatus::parse(&row.status)
            .ok_or_else(|| AppError::Internal(format!("Unknown payment status '{}'", row.status)))?;

        Ok(Payment {
            id: row.id,
            purchase_id: row.purchase_id,
            amount: row.amount,
            method,
            status,
            reference: row.reference,
            notes: row.notes,
            paid_at: parse_opt_timestamp(row.paid_at)?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[derive(Clone)]
pub struct SqlPaymentRepository {
    pool: AnyPool,
}

impl SqlPaymentRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for SqlPaymentRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Payment>, AppError> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE id = ?",
            PAYMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Payment::try_from).transpose()
    }

    async fn list_by_purchase(&self, purchase_id: i64) -> Result<Vec<Payment>, AppError> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {} FROM payments WHERE purchase_id = ? ORDER BY created_at, id",
            PAYMENT_COLUMNS
        ))
        .bind(purchase_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Payment::try_from).collect()
    }

    async fn create(&self, payment: &Payment) -> Result<Payment, AppError> {
        sqlx::query(
            r#"
            INSERT INTO payments (id, purchase_id, amount, method, status, reference, notes,
                                  paid_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(payment.id)
        .bind(payment.purchase_id)
        .bind(payment.amount)
        .bind(payment.method.as_str())
        .bind(payment.status.as_str())
        .bind(&payment.reference)
        .bind(&payment.notes)
        .bind(payment.paid_at.as_ref().map(format_timestamp))
        .bind(format_timestamp(&payment.created_at))
        .bind(format_timestamp(&payment.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(payment.clone())
    }

    async fn update(&self, payment: &Payment) -> Result<Payment, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET status = ?, reference = ?, notes = ?, paid_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(payment.status.as_str())
        .bind(&payment.reference)
        .bind(&payment.notes)
        .bind(payment.paid_at.as_ref().map(format_timestamp))
        .bind(format_timestamp(&payment.updated_at))
        .bind(payment.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Payment with id {} not found",
                payment.id
            )));
        }

        Ok(payment.clone())
    }
}
