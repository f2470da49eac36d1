//! Enrollment (reservation) entity and repository trait.
//!
//! Links a student to a class. Only `confirmed` enrollments consume capacity.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    #[default]
    Confirmed,
    Cancelled,
    Completed,
}

impl EnrollmentStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "confirmed" => Some(Self::Confirmed),
            "cancelled" => Some(Self::Cancelled),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: i64,
    pub student_id: i64,
    pub class_id: i64,

    /// Purchase whose class credit this enrollment consumed
    pub purchase_id: Option<i64>,

    pub status: EnrollmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Enrollment {
    pub fn is_confirmed(&self) -> bool {
        self.status == EnrollmentStatus::Confirmed
    }
}

/// Outcome of [`EnrollmentRepository::reserve`]. Every variant except
/// `Confirmed` left the store untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Reservation {
    Confirmed(Enrollment),
    AlreadyEnrolled,
    ClassFull,
    NoCredit,
}

#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Enrollment>, AppError>;

    async fn list_by_class(&self, class_id: i64) -> Result<Vec<Enrollment>, AppError>;

    async fn list_by_student(&self, student_id: i64) -> Result<Vec<Enrollment>, AppError>;

    /// The student's confirmed enrollment in a class, if any.
    async fn find_confirmed(
        &self,
        student_id: i64,
        class_id: i64,
    ) -> Result<Option<Enrollment>, AppError>;

    /// Insert a confirmed enrollment in one transaction: the class row is
    /// locked, capacity and duplicates are counted, and the purchase credit
    /// (if any) is taken before the insert.
    async fn reserve(&self, enrollment: &Enrollment, now: DateTime<Utc>)
        -> Result<Reservation, AppError>;

    /// Cancel a confirmed enrollment and give its credit back to a purchase
    /// that is not cancelled. `None` when it was no longer confirmed.
    async fn release(
        &self,
        enrollment_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Enrollment>, AppError>;

    async fn update(&self, enrollment: &Enrollment) -> Result<Enrollment, AppError>;
}
