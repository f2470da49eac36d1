//! Class Repository Implementation
//!
//! List queries are built from a [`ClassFilter`]; only the clauses for the
//! filters that are set are appended, with positional binds in the same order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::AnyPool;

use crate::domain::{
    Class, ClassFilter, ClassRepository, ClassStatus, EnrollmentStatus, PurchaseStatus,
};
use crate::infrastructure::database::{format_timestamp, parse_timestamp, to_i32};
use crate::shared::error::AppError;

const CLASS_COLUMNS: &str = "id, name, description, instructor_id, zone_id, start_time, \
                             end_time, capacity_limit, status, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ClassRow {
    id: i64,
    name: String,
    description: Option<String>,
    instructor_id: i64,
    zone_id: i64,
    start_time: String,
    end_time: String,
    capacity_limit: i64,
    status: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ClassRow> for Class {
    type Error = AppError;

    fn try_from(row: ClassRow) -> Result<Self, Self::Error> {
        let status = ClassStatus::parse(&row.status)
            .ok_or_else(|| AppError::Internal(format!("Unknown class status '{}'", row.status)))?;

        Ok(Class {
            id: row.id,
            name: row.name,
            description: row.description,
            instructor_id: row.instructor_id,
            zone_id: row.zone_id,
            start_time: parse_timestamp(&row.start_time)?,
            end_time: parse_timestamp(&row.end_time)?,
            capacity_limit: to_i32(row.capacity_limit, "capacity_limit")?,
            status,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

/// A bound value for a dynamically built WHERE clause.
enum FilterArg {
    Int(i64),
    Text(String),
}

fn filter_clauses(filter: &ClassFilter) -> (String, Vec<FilterArg>) {
    let mut clauses = Vec::new();
    let mut args = Vec::new();

    if let Some(from) = &filter.from {
        clauses.push("start_time >= ?");
        args.push(FilterArg::Text(format_timestamp(from)));
    }
    if let Some(to) = &filter.to {
        clauses.push("start_time < ?");
        args.push(FilterArg::Text(format_timestamp(to)));
    }
    if let Some(instructor_id) = filter.instructor_id {
        clauses.push("instructor_id = ?");
        args.push(FilterArg::Int(instructor_id));
    }
    if let Some(zone_id) = filter.zone_id {
        clauses.push("zone_id = ?");
        args.push(FilterArg::Int(zone_id));
    }
    if let Some(status) = filter.status {
        clauses.push("status = ?");
        args.push(FilterArg::Text(status.as_str().to_string()));
    }

    if clauses.is_empty() {
        (String::new(), args)
    } else {
        (format!("WHERE {}", clauses.join(" AND ")), args)
    }
}

#[derive(Clone)]
pub struct SqlClassRepository {
    pool: AnyPool,
}

impl SqlClassRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClassRepository for SqlClassRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Class>, AppError> {
        let row = sqlx::query_as::<_, ClassRow>(&format!(
            "SELECT {} FROM classes WHERE id = ?",
            CLASS_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Class::try_from).transpose()
    }

    async fn list(&self, filter: &ClassFilter) -> Result<Vec<Class>, AppError> {
        let (where_clause, args) = filter_clauses(filter);
        let sql = format!(
            "SELECT {} FROM classes {} ORDER BY start_time, id",
            CLASS_COLUMNS, where_clause
        );

        let mut query = sqlx::query_as::<_, ClassRow>(&sql);
        for arg in args {
            query = match arg {
                FilterArg::Int(value) => query.bind(value),
                FilterArg::Text(value) => query.bind(value),
            };
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Class::try_from).collect()
    }

    async fn create(&self, class: &Class) -> Result<Class, AppError> {
        sqlx::query(
            r#"
            INSERT INTO classes (id, name, description, instructor_id, zone_id, start_time,
                                 end_time, capacity_limit, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(class.id)
        .bind(&class.name)
        .bind(&class.description)
        .bind(class.instructor_id)
        .bind(class.zone_id)
        .bind(format_timestamp(&class.start_time))
        .bind(format_timestamp(&class.end_time))
        .bind(i64::from(class.capacity_limit))
        .bind(class.status.as_str())
        .bind(format_timestamp(&class.created_at))
        .bind(format_timestamp(&class.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(class.clone())
    }

    async fn update(&self, class: &Class) -> Result<Class, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE classes
            SET name = ?, description = ?, instructor_id = ?, zone_id = ?, start_time = ?,
                end_time = ?, capacity_limit = ?, status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&class.name)
        .bind(&class.description)
        .bind(class.instructor_id)
        .bind(class.zone_id)
        .bind(format_timestamp(&class.start_time))
        .bind(format_timestamp(&class.end_time))
        .bind(i64::from(class.capacity_limit))
        .bind(class.status.as_str())
        .bind(format_timestamp(&class.updated_at))
        .bind(class.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Class with id {} not found", class.id)));
        }

        Ok(class.clone())
    }

    async fn cancel(&self, class_id: i64, now: DateTime<Utc>) -> Result<Option<u64>, AppError> {
        let mut tx = self.pool.begin().await?;
        let now = format_timestamp(&now);
        let confirmed = EnrollmentStatus::Confirmed.as_str();

        let cancelled = sqlx::query(
            "UPDATE classes SET status = ?, updated_at = ? WHERE id = ? AND status = ?",
        )
        .bind(ClassStatus::Cancelled.as_str())
        .bind(now.as_str())
        .bind(class_id)
        .bind(ClassStatus::Scheduled.as_str())
        .execute(&mut *tx)
        .await?;

        if cancelled.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        // One credit back per confirmed enrollment drawn from each purchase
        sqlx::query(
            r#"
            UPDATE purchases
            SET remaining_classes = remaining_classes + (
                    SELECT COUNT(*) FROM enrollments e
                    WHERE e.purchase_id = purchases.id AND e.class_id = ? AND e.status = ?),
                updated_at = ?
            WHERE status <> ?
              AND id IN (SELECT purchase_id FROM enrollments
                         WHERE class_id = ? AND status = ? AND purchase_id IS NOT NULL)
            "#,
        )
        .bind(class_id)
        .bind(confirmed)
        .bind(now.as_str())
        .bind(PurchaseStatus::Cancelled.as_str())
        .bind(class_id)
        .bind(confirmed)
        .execute(&mut *tx)
        .await?;

        let released = sqlx::query(
            "UPDATE enrollments SET status = ?, updated_at = ? WHERE class_id = ? AND status = ?",
        )
        .bind(EnrollmentStatus::Cancelled.as_str())
        .bind(now.as_str())
        .bind(class_id)
        .bind(confirmed)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(released.rows_affected()))
    }
}
