//! Purchase Repository Implementation

use async_trait::async_trait;
use sqlx::AnyPool;

use crate::domain::{Purchase, PurchaseRepository, PurchaseStatus};
use crate::infrastructure::database::{format_timestamp, parse_timestamp, to_i32};
use crate::shared::error::AppError;

const PURCHASE_COLUMNS: &str = "id, student_id, package_id, purchased_at, expires_at, \
                                remaining_classes, status, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct PurchaseRow {
    id: i64,
    student_id: i64,
    package_id: i64,
    purchased_at: String,
    expires_at: String,
    remaining_classes: i64,
    status: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<PurchaseRow> for Purchase {
    type Error = AppError;

    fn try_from(row: PurchaseRow) -> Result<Self, Self::Error> {
        let status = PurchaseStatus::parse(&row.status).ok_or_else(|| {
            AppError::Internal(format!("Unknown purchase status '{}'", row.status))
        })?;

        Ok(Purchase {
            id: row.id,
            student_id: row.student_id,
            package_id: row.package_id,
            purchased_at: parse_timestamp(&row.purchased_at)?,
            expires_at: parse_timestamp(&row.expires_at)?,
            remaining_classes: to_i32(row.remaining_classes, "remaining_classes")?,
            status,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[derive(Clone)]
pub struct SqlPurchaseRepository {
    pool: AnyPool,
}

impl SqlPurchaseRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PurchaseRepository for SqlPurchaseRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Purchase>, AppError> {
        let row = sqlx::query_as::<_, PurchaseRow>(&format!(
            "SELECT {} FROM purchases WHERE id = ?",
            PURCHASE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Purchase::try_from).transpose()
    }

    async fn list_by_student(&self, student_id: i64) -> Result<Vec<Purchase>, AppError> {
        let rows = sqlx::query_as::<_, PurchaseRow>(&format!(
            "SELECT {} FROM purchases WHERE student_id = ? ORDER BY purchased_at DESC, id",
            PURCHASE_COLUMNS
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Purchase::try_from).collect()
    }

    async fn create(&self, purchase: &Purchase) -> Result<Purchase, AppError> {
        sqlx::query(
            r#"
            INSERT INTO purchases (id, student_id, package_id, purchased_at, expires_at,
                                   remaining_classes, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(purchase.id)
        .bind(purchase.student_id)
        .bind(purchase.package_id)
        .bind(format_timestamp(&purchase.purchased_at))
        .bind(format_timestamp(&purchase.expires_at))
        .bind(i64::from(purchase.remaining_classes))
        .bind(purchase.status.as_str())
        .bind(format_timestamp(&purchase.created_at))
        .bind(format_timestamp(&purchase.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(purchase.clone())
    }

    async fn update(&self, purchase: &Purchase) -> Result<Purchase, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE purchases
            SET expires_at = ?, remaining_classes = ?, status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(format_timestamp(&purchase.expires_at))
        .bind(i64::from(purchase.remaining_classes))
        .bind(purchase.status.as_str())
        .bind(format_timestamp(&purchase.updated_at))
        .bind(purchase.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Purchase with id {} not found",
                purchase.id
            )));
        }

        Ok(purchase.clone())
    }
}
