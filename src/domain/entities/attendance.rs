//! Attendance entity and repository trait.
//!
//! Record of a student attending a specific class.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendance {
    pub id: i64,
    pub student_id: i64,
    pub class_id: i64,
    pub attended_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    async fn find(&self, student_id: i64, class_id: i64) -> Result<Option<Attendance>, AppError>;

    async fn list_by_class(&self, class_id: i64) -> Result<Vec<Attendance>, AppError>;

    async fn list_by_student(&self, student_id: i64) -> Result<Vec<Attendance>, AppError>;

    async fn create(&self, attendance: &Attendance) -> Result<Attendance, AppError>;
}
