//! Student entity and repository trait.
//!
//! Maps to the `students` table.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::user::full_name;
use crate::shared::error::AppError;

/// Student profile, optionally linked 1:1 to a user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub user_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub emergency_contact: Option<String>,

    /// Injuries or conditions instructors should know about
    pub medical_notes: Option<String>,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}

/// Repository trait for Student data access operations.
#[async_trait]
pub trait StudentRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Student>, AppError>;

    /// Find the student profile linked to a user account.
    async fn find_by_user_id(&self, user_id: i64) -> Result<Option<Student>, AppError>;

    async fn list(&self, active_only: bool) -> Result<Vec<Student>, AppError>;

    async fn create(&self, student: &Student) -> Result<Student, AppError>;

    async fn update(&self, student: &Student) -> Result<Student, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;
}
