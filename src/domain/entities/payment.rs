//! Payment entity and repository trait.
//!
//! A monetary transaction tied to a purchase.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "refunded" => Some(Self::Refunded),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    /// Allowed status transitions. Failed and refunded payments are final.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Completed)
                | (Self::Pending, Self::Failed)
                | (Self::Completed, Self::Refunded)
        )
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Transfer,
}

impl PaymentMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cash" => Some(Self::Cash),
            "card" => Some(Self::Card),
            "transfer" => Some(Self::Transfer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Transfer => "transfer",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub purchase_id: i64,
    pub amount: f64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,

    /// External reference (card terminal receipt, bank transfer id)
    pub reference: Option<String>,

    pub notes: Option<String>,

    /// Set when the payment reaches `completed`
    pub paid_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Payment>, AppError>;

    async fn list_by_purchase(&self, purchase_id: i64) -> Result<Vec<Payment>, AppError>;

    async fn create(&self, payment: &Payment) -> Result<Payment, AppError>;

    async fn update(&self, payment: &Payment) -> Result<Payment, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(PaymentStatus::Pending, PaymentStatus::Completed, true)]
    #[test_case(PaymentStatus::Pending, PaymentStatus::Failed, true)]
    #[test_case(PaymentStatus::Completed, PaymentStatus::Refunded, true)]
    #[test_case(PaymentStatus::Completed, PaymentStatus::Pending, false)]
    #[test_case(PaymentStatus::Failed, PaymentStatus::Completed, false)]
    #[test_case(PaymentStatus::Refunded, PaymentStatus::Completed, false)]
    #[test_case(PaymentStatus::Pending, PaymentStatus::Refunded, false)]
    fn test_payment_transitions(from: PaymentStatus, to: PaymentStatus, allowed: bool) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn test_method_parse() {
        assert_eq!(PaymentMethod::parse("CARD"), Some(PaymentMethod::Card));
        assert_eq!(PaymentMethod::parse("crypto"), None);
    }
}
