//! Subscription and payment repositories.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::info;

use bais_models::{PaymentRecord, PlanTier, SubscriptionRecord};

use crate::error::DbResult;

use super::{parse_ts, parse_ts_opt};

/// Repository for subscription cycles.
pub struct SubscriptionRepository {
    pool: SqlitePool,
}

impl SubscriptionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new subscription record.
    pub async fn create(&self, sub: &SubscriptionRecord) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions
                (subscription_id, user_id, plan, started_at, ended_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&sub.subscription_id)
        .bind(&sub.user_id)
        .bind(sub.plan.as_str())
        .bind(sub.started_at.to_rfc3339())
        .bind(sub.ended_at.map(|dt| dt.to_rfc3339()))
        .bind(sub.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        info!(subscription_id = %sub.subscription_id, user_id = %sub.user_id, "Created subscription");
        Ok(())
    }

    /// The user's current subscription: open, or closed but not yet
    /// expired at `now`; most recently started wins.
    pub async fn current_for_user(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<Option<SubscriptionRecord>> {
        let row = sqlx::query(
            r#"
            SELECT * FROM subscriptions
            WHERE user_id = ? AND (ended_at IS NULL OR ended_at >= ?)
            ORDER BY started_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(now.to_rfc3339())
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_subscription).transpose()
    }

    /// The user's open subscription (no end date), if any.
    pub async fn open_for_user(&self, user_id: &str) -> DbResult<Option<SubscriptionRecord>> {
        let row = sqlx::query(
            r#"
            SELECT * FROM subscriptions
            WHERE user_id = ? AND ended_at IS NULL
            ORDER BY started_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_subscription).transpose()
    }

    /// The most recent closed-but-not-yet-expired subscription
    /// (the renewal target).
    pub async fn latest_renewable(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<Option<SubscriptionRecord>> {
        let row = sqlx::query(
            r#"
            SELECT * FROM subscriptions
            WHERE user_id = ? AND ended_at IS NOT NULL AND ended_at > ?
            ORDER BY started_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(now.to_rfc3339())
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_subscription).transpose()
    }

    /// Set or clear the end date.
    pub async fn set_ended(
        &self,
        subscription_id: &str,
        ended_at: Option<DateTime<Utc>>,
    ) -> DbResult<()> {
        sqlx::query("UPDATE subscriptions SET ended_at = ? WHERE subscription_id = ?")
            .bind(ended_at.map(|dt| dt.to_rfc3339()))
            .bind(subscription_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Whether the user has ever subscribed.
    pub async fn has_any_for_user(&self, user_id: &str) -> DbResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }
}

/// Repository for gateway payments.
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a completed payment.
    pub async fn create(&self, payment: &PaymentRecord) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO payments (payment_id, subscription_id, amount, transaction_id, paid_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&payment.payment_id)
        .bind(&payment.subscription_id)
        .bind(payment.amount as i64)
        .bind(&payment.transaction_id)
        .bind(payment.paid_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        info!(payment_id = %payment.payment_id, amount = payment.amount, "Recorded payment");
        Ok(())
    }

    /// The most recent payment on a subscription.
    pub async fn last_for_subscription(
        &self,
        subscription_id: &str,
    ) -> DbResult<Option<PaymentRecord>> {
        let row = sqlx::query(
            r#"
            SELECT * FROM payments
            WHERE subscription_id = ?
            ORDER BY paid_at DESC
            LIMIT 1
            "#,
        )
        .bind(subscription_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            Ok(PaymentRecord {
                payment_id: row.get("payment_id"),
                subscription_id: row.get("subscription_id"),
                amount: row.get::<i64, _>("amount").max(0) as u32,
                transaction_id: row.get("transaction_id"),
                paid_at: parse_ts(&row.get::<String, _>("paid_at"))?,
            })
        })
        .transpose()
    }
}

fn row_to_subscription(row: sqlx::sqlite::SqliteRow) -> DbResult<SubscriptionRecord> {
    Ok(SubscriptionRecord {
        subscription_id: row.get("subscription_id"),
        user_id: row.get("user_id"),
        plan: PlanTier::from_str(&row.get::<String, _>("plan")),
        started_at: parse_ts(&row.get::<String, _>("started_at"))?,
        ended_at: parse_ts_opt(row.get::<Option<String>, _>("ended_at").as_deref())?,
        created_at: parse_ts(&row.get::<String, _>("created_at"))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use chrono::Duration;

    async fn repos() -> (SubscriptionRepository, PaymentRepository) {
        let db = Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        (
            SubscriptionRepository::new(db.pool().clone()),
            PaymentRepository::new(db.pool().clone()),
        )
    }

    #[tokio::test]
    async fn test_open_and_current_selection() {
        let (subs, _) = repos().await;
        let now = Utc::now();

        // Closed, expired
        let mut old = SubscriptionRecord::new("user-1", PlanTier::Basic, now - Duration::days(90));
        old.ended_at = Some(now - Duration::days(60));
        subs.create(&old).await.unwrap();

        // Open
        let open = SubscriptionRecord::new("user-1", PlanTier::Premium, now - Duration::days(5));
        subs.create(&open).await.unwrap();

        let found = subs.open_for_user("user-1").await.unwrap().unwrap();
        assert_eq!(found.subscription_id, open.subscription_id);

        let current = subs.current_for_user("user-1", now).await.unwrap().unwrap();
        assert_eq!(current.subscription_id, open.subscription_id);

        assert!(subs.has_any_for_user("user-1").await.unwrap());
        assert!(!subs.has_any_for_user("user-2").await.unwrap());
    }

    #[tokio::test]
    async fn test_renewable_excludes_open_and_expired() {
        let (subs, _) = repos().await;
        let now = Utc::now();

        // Expired long ago - not renewable
        let mut expired =
            SubscriptionRecord::new("user-1", PlanTier::Basic, now - Duration::days(90));
        expired.ended_at = Some(now - Duration::days(1));
        subs.create(&expired).await.unwrap();

        assert!(subs.latest_renewable("user-1", now).await.unwrap().is_none());

        // Cancelled but still inside the paid cycle - renewable
        let mut cancelled =
            SubscriptionRecord::new("user-1", PlanTier::Basic, now - Duration::days(10));
        cancelled.ended_at = Some(now + Duration::days(20));
        subs.create(&cancelled).await.unwrap();

        let target = subs.latest_renewable("user-1", now).await.unwrap().unwrap();
        assert_eq!(target.subscription_id, cancelled.subscription_id);

        // Clearing the end date reopens it
        subs.set_ended(&target.subscription_id, None).await.unwrap();
        assert!(subs.open_for_user("user-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_last_payment_ordering() {
        let (subs, payments) = repos().await;
        let now = Utc::now();

        let sub = SubscriptionRecord::new("user-1", PlanTier::Basic, now);
        subs.create(&sub).await.unwrap();

        let first = PaymentRecord::new(
            sub.subscription_id.clone(),
            9_900,
            "sid-1",
            now - Duration::days(30),
        );
        let second = PaymentRecord::new(sub.subscription_id.clone(), 9_900, "sid-2", now);
        payments.create(&first).await.unwrap();
        payments.create(&second).await.unwrap();

        let last = payments
            .last_for_subscription(&sub.subscription_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(last.transaction_id, "sid-2");
    }
}
