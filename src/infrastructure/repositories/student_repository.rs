//! Student Repository Implementation

use async_trait::async_trait;
use sqlx::AnyPool;

use crate::domain::{Student, StudentRepository};
use crate::infrastructure::database::{
    conflict_on_reference, conflict_on_unique, format_date, format_timestamp, parse_date,
    parse_timestamp,
};
use crate::shared::error::AppError;

const STUDENT_COLUMNS: &str = "id, user_id, first_name, last_name, email, phone, birth_date, \
                               emergency_contact, medical_notes, is_active, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct StudentRow {
    id: i64,
    user_id: Option<i64>,
    first_name: String,
    last_name: String,
    email: Option<String>,
    phone: Option<String>,
    birth_date: Option<String>,
    emergency_contact: Option<String>,
    medical_notes: Option<String>,
    is_active: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<StudentRow> for Student {
    type Error = AppError;

    fn try_from(row: StudentRow) -> Result<Self, Self::Error> {
        Ok(Student {
            id: row.id,
            user_id: row.user_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            birth_date: row.birth_date.as_deref().map(parse_date).transpose()?,
            emergency_contact: row.emergency_contact,
            medical_notes: row.medical_notes,
            is_active: row.is_active != 0,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[derive(Clone)]
pub struct SqlStudentRepository {
    pool: AnyPool,
}

impl SqlStudentRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentRepository for SqlStudentRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Student>, AppError> {
        let row = sqlx::query_as::<_, StudentRow>(&format!(
            "SELECT {} FROM students WHERE id = ?",
            STUDENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Student::try_from).transpose()
    }

    async fn find_by_user_id(&self, user_id: i64) -> Result<Option<Student>, AppError> {
        let row = sqlx::query_as::<_, StudentRow>(&format!(
            "SELECT {} FROM students WHERE user_id = ?",
            STUDENT_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Student::try_from).transpose()
    }

    async fn list(&self, active_only: bool) -> Result<Vec<Student>, AppError> {
        let filter = if active_only { "WHERE is_active = 1" } else { "" };
        let rows = sqlx::query_as::<_, StudentRow>(&format!(
            "SELECT {} FROM students {} ORDER BY last_name, first_name, id",
            STUDENT_COLUMNS, filter
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Student::try_from).collect()
    }

    async fn create(&self, student: &Student) -> Result<Student, AppError> {
        sqlx::query(
            r#"
            INSERT INTO students (id, user_id, first_name, last_name, email, phone, birth_date,
                                  emergency_contact, medical_notes, is_active, created_at,
                                  updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(student.id)
        .bind(student.user_id)
        .bind(&student.first_name)
        .bind(&student.last_name)
        .bind(&student.email)
        .bind(&student.phone)
        .bind(student.birth_date.as_ref().map(format_date))
        .bind(&student.emergency_contact)
        .bind(&student.medical_notes)
        .bind(i64::from(student.is_active))
        .bind(format_timestamp(&student.created_at))
        .bind(format_timestamp(&student.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "El usuario ya tiene un perfil de alumno"))?;

        Ok(student.clone())
    }

    async fn update(&self, student: &Student) -> Result<Student, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE students
            SET first_name = ?, last_name = ?, email = ?, phone = ?, birth_date = ?,
                emergency_contact = ?, medical_notes = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&student.first_name)
        .bind(&student.last_name)
        .bind(&student.email)
        .bind(&student.phone)
        .bind(student.birth_date.as_ref().map(format_date))
        .bind(&student.emergency_contact)
        .bind(&student.medical_notes)
        .bind(i64::from(student.is_active))
        .bind(format_timestamp(&student.updated_at))
        .bind(student.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Student with id {} not found",
                student.id
            )));
        }

        Ok(student.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_on_reference(e, "El alumno tiene registros asociados"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Student with id {} not found", id)));
        }

        Ok(())
    }
}
