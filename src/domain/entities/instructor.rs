//! Instructor entity and repository trait.
//!
//! Maps to the `instructors` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::full_name;
use crate::shared::error::AppError;

/// Instructor profile, optionally linked 1:1 to a user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instructor {
    pub id: i64,

    /// Linked user account, if the instructor can log in
    pub user_id: Option<i64>,

    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,

    /// Main discipline (e.g. "Reformer", "Mat")
    pub specialty: Option<String>,

    pub bio: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Instructor {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}

/// Repository trait for Instructor data access operations.
#[async_trait]
pub trait InstructorRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Instructor>, AppError>;

    /// Find the instructor profile linked to a user account.
    async fn find_by_user_id(&self, user_id: i64) -> Result<Option<Instructor>, AppError>;

    /// List instructors, optionally only active ones.
    async fn list(&self, active_only: bool) -> Result<Vec<Instructor>, AppError>;

    async fn create(&self, instructor: &Instructor) -> Result<Instructor, AppError>;

    async fn update(&self, instructor: &Instructor) -> Result<Instructor, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;
}
