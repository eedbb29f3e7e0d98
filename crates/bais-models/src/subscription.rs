//! Subscription and payment records.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::PlanTier;

/// A subscription cycle record.
///
/// An open record (`ended_at == None`) means the subscription is active.
/// At most one open record per user is the intended invariant; the
/// storage layer does not enforce it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SubscriptionRecord {
    pub subscription_id: String,
    pub user_id: String,
    pub plan: PlanTier,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl SubscriptionRecord {
    /// Create a new open subscription starting at `started_at`.
    pub fn new(user_id: impl Into<String>, plan: PlanTier, started_at: DateTime<Utc>) -> Self {
        Self {
            subscription_id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            plan,
            started_at,
            ended_at: None,
            created_at: Utc::now(),
        }
    }

    /// Whether the subscription is open (no end date).
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Whether the subscription covers the given instant.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        match self.ended_at {
            None => true,
            Some(end) => end >= now,
        }
    }
}

/// A completed gateway payment, one per billing cycle.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PaymentRecord {
    pub payment_id: String,
    pub subscription_id: String,
    /// Amount in KRW
    pub amount: u32,
    /// Gateway transaction id (`sid`)
    pub transaction_id: String,
    pub paid_at: DateTime<Utc>,
}

impl PaymentRecord {
    pub fn new(
        subscription_id: impl Into<String>,
        amount: u32,
        transaction_id: impl Into<String>,
        paid_at: DateTime<Utc>,
    ) -> Self {
        Self {
            payment_id: Uuid::new_v4().to_string(),
            subscription_id: subscription_id.into(),
            amount,
            transaction_id: transaction_id.into(),
            paid_at,
        }
    }
}
