//! Package entity and repository trait.
//!
//! A purchasable bundle of classes valid for a number of days.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,

    /// Number of class credits granted by a purchase
    pub class_count: i32,

    /// Days a purchase stays valid after the purchase date
    pub validity_days: i32,

    pub price: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait PackageRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Package>, AppError>;

    async fn list(&self, active_only: bool) -> Result<Vec<Package>, AppError>;

    async fn create(&self, package: &Package) -> Result<Package, AppError>;

    async fn update(&self, package: &Package) -> Result<Package, AppError>;
}
