//! Purchase entity and repository trait.
//!
//! A student's acquisition of a package. Tracks remaining class credits and
//! the expiration date.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    #[default]
    Active,
    Expired,
    Cancelled,
}

impl PurchaseStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "expired" => Some(Self::Expired),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: i64,
    pub student_id: i64,
    pub package_id: i64,
    pub purchased_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub remaining_classes: i32,
    pub status: PurchaseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Purchase {
    /// Status as of `now`: an active purchase past its expiration is expired.
    pub fn effective_status(&self, now: DateTime<Utc>) -> PurchaseStatus {
        match self.status {
            PurchaseStatus::Active if self.expires_at <= now => PurchaseStatus::Expired,
            status => status,
        }
    }

    /// Whether a class credit can be taken from this purchase at `now`.
    pub fn has_credit(&self, now: DateTime<Utc>) -> bool {
        self.effective_status(now) == PurchaseStatus::Active && self.remaining_classes > 0
    }
}

#[async_trait]
pub trait PurchaseRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Purchase>, AppError>;

    async fn list_by_student(&self, student_id: i64) -> Result<Vec<Purchase>, AppError>;

    async fn create(&self, purchase: &Purchase) -> Result<Purchase, AppError>;

    async fn update(&self, purchase: &Purchase) -> Result<Purchase, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn purchase(expires_in_days: i64, remaining: i32, status: PurchaseStatus) -> Purchase {
        let now = Utc::now();
        Purchase {
            id: 1,
            student_id: 2,
            package_id: 3,
            purchased_at: now,
            expires_at: now + Duration::days(expires_in_days),
            remaining_classes: remaining,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_active_purchase_past_expiration_is_expired() {
        let p = purchase(-1, 4, PurchaseStatus::Active);
        assert_eq!(p.effective_status(Utc::now()), PurchaseStatus::Expired);
        assert!(!p.has_credit(Utc::now()));
    }

    #[test]
    fn test_has_credit_requires_remaining_classes() {
        assert!(purchase(10, 1, PurchaseStatus::Active).has_credit(Utc::now()));
        assert!(!purchase(10, 0, PurchaseStatus::Active).has_credit(Utc::now()));
        assert!(!purchase(10, 5, PurchaseStatus::Cancelled).has_credit(Utc::now()));
    }
}
