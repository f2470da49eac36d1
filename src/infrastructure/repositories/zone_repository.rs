//! Zone Repository Implementation

use async_trait::async_trait;
use sqlx::AnyPool;

use crate::domain::{Zone, ZoneRepository};
use crate::infrastructure::database::{
    conflict_on_reference, format_timestamp, parse_timestamp, to_i32,
};
use crate::shared::error::AppError;

const ZONE_COLUMNS: &str = "id, name, description, capacity, is_active, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ZoneRow {
    id: i64,
    name: String,
    description: Option<String>,
    capacity: Option<i64>,
    is_active: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ZoneRow> for Zone {
    type Error = AppError;

    fn try_from(row: ZoneRow) -> Result<Self, Self::Error> {
        Ok(Zone {
            id: row.id,
            name: row.name,
            description: row.description,
            capacity: row.capacity.map(|c| to_i32(c, "capacity")).transpose()?,
            is_active: row.is_active != 0,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[derive(Clone)]
pub struct SqlZoneRepository {
    pool: AnyPool,
}

impl SqlZoneRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ZoneRepository for SqlZoneRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Zone>, AppError> {
        let row = sqlx::query_as::<_, ZoneRow>(&format!(
            "SELECT {} FROM zones WHERE id = ?",
            ZONE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Zone::try_from).transpose()
    }

    async fn list(&self, active_only: bool) -> Result<Vec<Zone>, AppError> {
        let filter = if active_only { "WHERE is_active = 1" } else { "" };
        let rows = sqlx::query_as::<_, ZoneRow>(&format!(
            "SELECT {} FROM zones {} ORDER BY name, id",
            ZONE_COLUMNS, filter
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Zone::try_from).collect()
    }

    async fn create(&self, zone: &Zone) -> Result<Zone, AppError> {
        sqlx::query(
            r#"
            INSERT INTO zones (id, name, description, capacity, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(zone.id)
        .bind(&zone.name)
        .bind(&zone.description)
        .bind(zone.capacity.map(i64::from))
        .bind(i64::from(zone.is_active))
        .bind(format_timestamp(&zone.created_at))
        .bind(format_timestamp(&zone.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(zone.clone())
    }

    async fn update(&self, zone: &Zone) -> Result<Zone, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE zones
            SET name = ?, description = ?, capacity = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&zone.name)
        .bind(&zone.description)
        .bind(zone.capacity.map(i64::from))
        .bind(i64::from(zone.is_active))
        .bind(format_timestamp(&zone.updated_at))
        .bind(zone.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Zone with id {} not found", zone.id)));
        }

        Ok(zone.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM zones WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_on_reference(e, "La zona tiene registros asociados"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Zone with id {} not found", id)));
        }

        Ok(())
    }
}
