//! Enrollment Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::AnyPool;

use crate::domain::{
    Enrollment, EnrollmentRepository, EnrollmentStatus, PurchaseStatus, Reservation,
};
use crate::infrastructure::database::{format_timestamp, parse_timestamp};
use crate::shared::error::AppError;

const ENROLLMENT_COLUMNS: &str =
    "id, student_id, class_id, purchase_id, status, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct EnrollmentRow {
    id: i64,
    student_id: i64,
    class_id: i64,
    purchase_id: Option<i64>,
    status: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<EnrollmentRow> for Enrollment {
    type Error = AppError;

    fn try_from(row: EnrollmentRow) -> Result<Self, Self::Error> {
        let status = EnrollmentStatus::parse(&row.status).ok_or_else(|| {
            AppError::Internal(format!("Unknown enrollment status '{}'", row.status))
        })?;

        Ok(Enrollment {
            id: row.id,
            student_id: row.student_id,
            class_id: row.class_id,
            purchase_id: row.purchase_id,
            status,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[derive(Clone)]
pub struct SqlEnrollmentRepository {
    pool: AnyPool,
}

impl SqlEnrollmentRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    async fn fetch_many(&self, sql: &str, id: i64) -> Result<Vec<Enrollment>, AppError> {
        let rows = sqlx::query_as::<_, EnrollmentRow>(sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Enrollment::try_from).collect()
    }
}

#[async_trait]
impl EnrollmentRepository for SqlEnrollmentRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Enrollment>, AppError> {
        let row = sqlx::query_as::<_, EnrollmentRow>(&format!(
            "SELECT {} FROM enrollments WHERE id = ?",
            ENROLLMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Enrollment::try_from).transpose()
    }

    async fn list_by_class(&self, class_id: i64) -> Result<Vec<Enrollment>, AppError> {
        let sql = format!(
            "SELECT {} FROM enrollments WHERE class_id = ? ORDER BY created_at, id",
            ENROLLMENT_COLUMNS
        );
        self.fetch_many(&sql, class_id).await
    }

    async fn list_by_student(&self, student_id: i64) -> Result<Vec<Enrollment>, AppError> {
        let sql = format!(
            "SELECT {} FROM enrollments WHERE student_id = ? ORDER BY created_at DESC, id",
            ENROLLMENT_COLUMNS
        );
        self.fetch_many(&sql, student_id).await
    }

    async fn find_confirmed(
        &self,
        student_id: i64,
        class_id: i64,
    ) -> Result<Option<Enrollment>, AppError> {
        let row = sqlx::query_as::<_, EnrollmentRow>(&format!(
            "SELECT {} FROM enrollments WHERE student_id = ? AND class_id = ? AND status = ?",
            ENROLLMENT_COLUMNS
        ))
        .bind(student_id)
        .bind(class_id)
        .bind(EnrollmentStatus::Confirmed.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Enrollment::try_from).transpose()
    }

    async fn reserve(
        &self,
        enrollment: &Enrollment,
        now: DateTime<Utc>,
    ) -> Result<Reservation, AppError> {
        let mut tx = self.pool.begin().await?;

        // Writing first takes the row lock on MySQL and the database write
        // lock on SQLite, so concurrent reservations for a class serialize here.
        sqlx::query("UPDATE classes SET capacity_limit = capacity_limit WHERE id = ?")
            .bind(enrollment.class_id)
            .execute(&mut *tx)
            .await?;

        let counts: Option<(i64, i64, i64)> = sqlx::query_as(
            r#"
            SELECT c.capacity_limit,
                   (SELECT COUNT(*) FROM enrollments e
                    WHERE e.class_id = c.id AND e.status = ?),
                   (SELECT COUNT(*) FROM enrollments d
                    WHERE d.class_id = c.id AND d.student_id = ? AND d.status = ?)
            FROM classes c
            WHERE c.id = ?
            "#,
        )
        .bind(EnrollmentStatus::Confirmed.as_str())
        .bind(enrollment.student_id)
        .bind(EnrollmentStatus::Confirmed.as_str())
        .bind(enrollment.class_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((capacity_limit, reserved, own)) = counts else {
            return Err(AppError::NotFound(format!(
                "Class with id {} not found",
                enrollment.class_id
            )));
        };

        if own > 0 {
            tx.rollback().await?;
            return Ok(Reservation::AlreadyEnrolled);
        }
        if reserved >= capacity_limit {
            tx.rollback().await?;
            return Ok(Reservation::ClassFull);
        }

        if let Some(purchase_id) = enrollment.purchase_id {
            let debited = sqlx::query(
                r#"
                UPDATE purchases
                SET remaining_classes = remaining_classes - 1, updated_at = ?
                WHERE id = ? AND student_id = ? AND status = ?
                  AND remaining_classes > 0 AND expires_at > ?
                "#,
            )
            .bind(format_timestamp(&now))
            .bind(purchase_id)
            .bind(enrollment.student_id)
            .bind(PurchaseStatus::Active.as_str())
            .bind(format_timestamp(&now))
            .execute(&mut *tx)
            .await?;

            if debited.rows_affected() == 0 {
                tx.rollback().await?;
                return Ok(Reservation::NoCredit);
            }
        }

        sqlx::query(
            r#"
            INSERT INTO enrollments (id, student_id, class_id, purchase_id, status,
                                     created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(enrollment.id)
        .bind(enrollment.student_id)
        .bind(enrollment.class_id)
        .bind(enrollment.purchase_id)
        .bind(enrollment.status.as_str())
        .bind(format_timestamp(&enrollment.created_at))
        .bind(format_timestamp(&enrollment.updated_at))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Reservation::Confirmed(enrollment.clone()))
    }

    async fn release(
        &self,
        enrollment_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Enrollment>, AppError> {
        let mut tx = self.pool.begin().await?;

        let cancelled = sqlx::query(
            "UPDATE enrollments SET status = ?, updated_at = ? WHERE id = ? AND status = ?",
        )
        .bind(EnrollmentStatus::Cancelled.as_str())
        .bind(format_timestamp(&now))
        .bind(enrollment_id)
        .bind(EnrollmentStatus::Confirmed.as_str())
        .execute(&mut *tx)
        .await?;

        if cancelled.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let row = sqlx::query_as::<_, EnrollmentRow>(&format!(
            "SELECT {} FROM enrollments WHERE id = ?",
            ENROLLMENT_COLUMNS
        ))
        .bind(enrollment_id)
        .fetch_one(&mut *tx)
        .await?;
        let enrollment = Enrollment::try_from(row)?;

        if let Some(purchase_id) = enrollment.purchase_id {
            sqlx::query(
                r#"
                UPDATE purchases
                SET remaining_classes = remaining_classes + 1, updated_at = ?
                WHERE id = ? AND status <> ?
                "#,
            )
            .bind(format_timestamp(&now))
            .bind(purchase_id)
            .bind(PurchaseStatus::Cancelled.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Some(enrollment))
    }

    async fn update(&self, enrollment: &Enrollment) -> Result<Enrollment, AppError> {
        let result = sqlx::query(
            "UPDATE enrollments SET purchase_id = ?, status = ?, updated_at = ? WHERE id = ?",
        )
        .bind(enrollment.purchase_id)
        .bind(enrollment.status.as_str())
        .bind(format_timestamp(&enrollment.updated_at))
        .bind(enrollment.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Enrollment with id {} not found",
                enrollment.id
            )));
        }

        Ok(enrollment.clone())
    }
}
