//! Instructor Repository Implementation

use async_trait::async_trait;
use sqlx::AnyPool;

use crate::domain::{Instructor, InstructorRepository};
use crate::infrastructure::database::{
    conflict_on_reference, conflict_on_unique, format_timestamp, parse_timestamp,
};
use crate::shared::error::AppError;

const INSTRUCTOR_COLUMNS: &str = "id, user_id, first_name, last_name, email, phone, specialty, \
                                  bio, is_active, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct InstructorRow {
    id: i64,
    user_id: Option<i64>,
    first_name: String,
    last_name: String,
    email: Option<String>,
    phone: Option<String>,
    specialty: Option<String>,
    bio: Option<String>,
    is_active: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<InstructorRow> for Instructor {
    type Error = AppError;

    fn try_from(row: InstructorRow) -> Result<Self, Self::Error> {
        Ok(Instructor {
            id: row.id,
            user_id: row.user_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            specialty: row.specialty,
            bio: row.bio,
            is_active: row.is_active != 0,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[derive(Clone)]
pub struct SqlInstructorRepository {
    pool: AnyPool,
}

impl SqlInstructorRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InstructorRepository for SqlInstructorRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Instructor>, AppError> {
        let row = sqlx::query_as::<_, InstructorRow>(&format!(
            "SELECT {} FROM instructors WHERE id = ?",
            INSTRUCTOR_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Instructor::try_from).transpose()
    }

    async fn find_by_user_id(&self, user_id: i64) -> Result<Option<Instructor>, AppError> {
        let row = sqlx::query_as::<_, InstructorRow>(&format!(
            "SELECT {} FROM instructors WHERE user_id = ?",
            INSTRUCTOR_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Instructor::try_from).transpose()
    }

    async fn list(&self, active_only: bool) -> Result<Vec<Instructor>, AppError> {
        let sql = if active_only {
            format!(
                "SELECT {} FROM instructors WHERE is_active = 1 ORDER BY last_name, first_name, id",
                INSTRUCTOR_COLUMNS
            )
        } else {
            format!(
                "SELECT {} FROM instructors ORDER BY last_name, first_name, id",
                INSTRUCTOR_COLUMNS
            )
        };

        let rows = sqlx::query_as::<_, InstructorRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Instructor::try_from).collect()
    }

    async fn create(&self, instructor: &Instructor) -> Result<Instructor, AppError> {
        sqlx::query(
            r#"
            INSERT INTO instructors (id, user_id, first_name, last_name, email, phone,
                                     specialty, bio, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(instructor.id)
        .bind(instructor.user_id)
        .bind(&instructor.first_name)
        .bind(&instructor.last_name)
        .bind(&instructor.email)
        .bind(&instructor.phone)
        .bind(&instructor.specialty)
        .bind(&instructor.bio)
        .bind(i64::from(instructor.is_active))
        .bind(format_timestamp(&instructor.created_at))
        .bind(format_timestamp(&instructor.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "El usuario ya tiene un perfil de instructor"))?;

        Ok(instructor.clone())
    }

    async fn update(&self, instructor: &Instructor) -> Result<Instructor, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE instructors
            SET first_name = ?, last_name = ?, email = ?, phone = ?, specialty = ?,
                bio = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&instructor.first_name)
        .bind(&instructor.last_name)
        .bind(&instructor.email)
        .bind(&instructor.phone)
        .bind(&instructor.specialty)
        .bind(&instructor.bio)
        .bind(i64::from(instructor.is_active))
        .bind(format_timestamp(&instructor.updated_at))
        .bind(instructor.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Instructor with id {} not found",
                instructor.id
            )));
        }

        Ok(instructor.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM instructors WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_on_reference(e, "El instructor tiene registros asociados"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Instructor with id {} not found", id)));
        }

        Ok(())
    }
}
