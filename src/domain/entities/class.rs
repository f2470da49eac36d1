//! Class entity and repository trait.
//!
//! Maps to the `classes` table. A class is one scheduled session with a
//! capacity limit, an instructor and a zone.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Class lifecycle status, stored as a lowercase string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassStatus {
    #[default]
    Scheduled,
    Cancelled,
    Completed,
}

impl ClassStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "scheduled" => Some(Self::Scheduled),
            "cancelled" => Some(Self::Cancelled),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for ClassStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub instructor_id: i64,
    pub zone_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,

    /// Maximum number of confirmed enrollments
    pub capacity_limit: i32,

    pub status: ClassStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Class {
    /// Only scheduled classes that have not started accept enrollments.
    pub fn accepts_enrollments(&self, now: DateTime<Utc>) -> bool {
        self.status == ClassStatus::Scheduled && self.start_time > now
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

/// Filters for listing classes. `None` means unrestricted.
#[derive(Debug, Clone, Default)]
pub struct ClassFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub instructor_id: Option<i64>,
    pub zone_id: Option<i64>,
    pub status: Option<ClassStatus>,
}

#[async_trait]
pub trait ClassRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Class>, AppError>;

    /// List classes matching the filter, ordered by start time.
    async fn list(&self, filter: &ClassFilter) -> Result<Vec<Class>, AppError>;

    async fn create(&self, class: &Class) -> Result<Class, AppError>;

    async fn update(&self, class: &Class) -> Result<Class, AppError>;

    /// Cancel a scheduled class together with its confirmed enrollments,
    /// returning their purchase credits. `None` when the class was not
    /// scheduled; otherwise the number of enrollments released.
    async fn cancel(&self, class_id: i64, now: DateTime<Utc>) -> Result<Option<u64>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn class_at(start: DateTime<Utc>, status: ClassStatus) -> Class {
        Class {
            id: 1,
            name: "Reformer".into(),
            description: None,
            instructor_id: 2,
            zone_id: 3,
            start_time: start,
            end_time: start + Duration::minutes(50),
            capacity_limit: 10,
            status,
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn test_accepts_enrollments_only_when_scheduled_and_future() {
        let now = Utc::now();
        assert!(class_at(now + Duration::hours(1), ClassStatus::Scheduled).accepts_enrollments(now));
        assert!(!class_at(now - Duration::hours(1), ClassStatus::Scheduled).accepts_enrollments(now));
        assert!(!class_at(now + Duration::hours(1), ClassStatus::Cancelled).accepts_enrollments(now));
    }

    #[test]
    fn test_duration_minutes() {
        assert_eq!(class_at(Utc::now(), ClassStatus::Scheduled).duration_minutes(), 50);
    }

    #[test]
    fn test_status_parse_roundtrip() {
        for status in [ClassStatus::Scheduled, ClassStatus::Cancelled, ClassStatus::Completed] {
            assert_eq!(ClassStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ClassStatus::parse("postponed"), None);
    }
}
