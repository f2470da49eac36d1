//! Attendance Repository Implementation

use async_trait::async_trait;
use sqlx::AnyPool;

use crate::domain::{Attendance, AttendanceRepository};
use crate::infrastructure::database::{conflict_on_unique, format_timestamp, parse_timestamp};
use crate::shared::error::AppError;

const ATTENDANCE_COLUMNS: &str =
    "id, student_id, class_id, attended_at, notes, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct AttendanceRow {
    id: i64,
    student_id: i64,
    class_id: i64,
    attended_at: String,
    notes: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<AttendanceRow> for Attendance {
    type Error = AppError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        Ok(Attendance {
            id: row.id,
            student_id: row.student_id,
            class_id: row.class_id,
            attended_at: parse_timestamp(&row.attended_at)?,
            notes: row.notes,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[derive(Clone)]
pub struct SqlAttendanceRepository {
    pool: AnyPool,
}

impl SqlAttendanceRepository {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceRepository for SqlAttendanceRepository {
    async fn find(&self, student_id: i64, class_id: i64) -> Result<Option<Attendance>, AppError> {
        let row = sqlx::query_as::<_, AttendanceRow>(&format!(
            "SELECT {} FROM attendances WHERE student_id = ? AND class_id = ?",
            ATTENDANCE_COLUMNS
        ))
        .bind(student_id)
        .bind(class_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Attendance::try_from).transpose()
    }

    async fn list_by_class(&self, class_id: i64) -> Result<Vec<Attendance>, AppError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(&format!(
            "SELECT {} FROM attendances WHERE class_id = ? ORDER BY attended_at, id",
            ATTENDANCE_COLUMNS
        ))
        .bind(class_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Attendance::try_from).collect()
    }

    async fn list_by_student(&self, student_id: i64) -> Result<Vec<Attendance>, AppError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(&format!(
            "SELECT {} FROM attendances WHERE student_id = ? ORDER BY attended_at DESC, id",
            ATTENDANCE_COLUMNS
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Attendance::try_from).collect()
    }

    async fn create(&self, attendance: &Attendance) -> Result<Attendance, AppError> {
        sqlx::query(
            r#"
            INSERT INTO attendances (id, student_id, class_id, attended_at, notes,
                                     created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(attendance.id)
        .bind(attendance.student_id)
        .bind(attendance.class_id)
        .bind(format_timestamp(&attendance.attended_at))
        .bind(&attendance.notes)
        .bind(format_timestamp(&attendance.created_at))
        .bind(format_timestamp(&attendance.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "La asistencia ya fue registrada"))?;

        Ok(attendance.clone())
    }
}
