//! Package Repository Implementation

use async_trait::async_trait;
use sqlx::AnyPool;

use crate::domain::{Package, PackageRepository};
use crate::infrastructure::database::{format_timestamp, parse_timestamp, to_i32};
use crate::shared::error::AppError;

const PACKAGE_COLUMNS: &str = "id, name, description, class_count, validity_days, price, \
                               is_active, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct PackageRow {
    id: i64,
    name: String,
    description: Option<String>,
    class_count: i64,
    validity_days: i64,
    price: f64,
    is_active: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<PackageRow> for Package {
    type Error = AppError;

    fn try_from(row: PackageRow) -> Result<Self, Self::Error> {
        Ok(Package {
            id: row.id,
            name: row.name,
            description: row.description,
            class_count: to_i32(row.class_count, "class_count")?,
            validity_days: to_i32(row.validity_days, "validity_days")?,
            price: row.price,
            is_active: row.is_active != 0,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[derive(Clone)]
pub struct SqlPackageRepository {
    pool: AnyPool,
}

impl SqlPackageRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PackageRepository for SqlPackageRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Package>, AppError> {
        let row = sqlx::query_as::<_, PackageRow>(&format!(
            "SELECT {} FROM packages WHERE id = ?",
            PACKAGE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Package::try_from).transpose()
    }

    async fn list(&self, active_only: bool) -> Result<Vec<Package>, AppError> {
        let filter = if active_only { "WHERE is_active = 1" } else { "" };
        let rows = sqlx::query_as::<_, PackageRow>(&format!(
            "SELECT {} FROM packages {} ORDER BY price, name, id",
            PACKAGE_COLUMNS, filter
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Package::try_from).collect()
    }

    async fn create(&self, package: &Package) -> Result<Package, AppError> {
        sqlx::query(
            r#"
            INSERT INTO packages (id, name, description, class_count, validity_days, price,
                                  is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(package.id)
        .bind(&package.name)
        .bind(&package.description)
        .bind(i64::from(package.class_count))
        .bind(i64::from(package.validity_days))
        .bind(package.price)
        .bind(i64::from(package.is_active))
        .bind(format_timestamp(&package.created_at))
        .bind(format_timestamp(&package.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(package.clone())
    }

    async fn update(&self, package: &Package) -> Result<Package, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE packages
            SET name = ?, description = ?, class_count = ?, validity_days = ?, price = ?,
                is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&package.name)
        .bind(&package.description)
        .bind(i64::from(package.class_count))
        .bind(i64::from(package.validity_days))
        .bind(package.price)
        .bind(i64::from(package.is_active))
        .bind(format_timestamp(&package.updated_at))
        .bind(package.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Package with id {} not found",
                package.id
            )));
        }

        Ok(package.clone())
    }
}
