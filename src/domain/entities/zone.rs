//! Zone entity and repository trait.
//!
//! A zone is a room or area of the studio where classes take place.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,

    /// Physical equipment/space limit, if any
    pub capacity: Option<i32>,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait ZoneRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Zone>, AppError>;

    async fn list(&self, active_only: bool) -> Result<Vec<Zone>, AppError>;

    async fn create(&self, zone: &Zone) -> Result<Zone, AppError>;

    async fn update(&self, zone: &Zone) -> Result<Zone, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;
}
