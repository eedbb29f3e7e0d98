//! Subscription billing service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use bais_db::{Database, PaymentRepository, SubscriptionRepository};
use bais_models::{cycle, PaymentRecord, PlanTier, SubscriptionRecord};

use crate::error::{BillingError, BillingResult};
use crate::kakao::KakaoPayClient;

/// Payment state held between `ready` and `approve`.
///
/// The caller keeps this (keyed by partner order id) until the user
/// returns from the gateway redirect with a pg_token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingPayment {
    pub partner_order_id: String,
    pub user_id: String,
    pub plan: PlanTier,
    pub amount: u32,
    pub tid: String,
}

/// Receipt for a completed subscription payment.
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub subscription_id: String,
    pub plan_name: String,
    pub amount: u32,
    pub paid_at: DateTime<Utc>,
    pub cycle_started_at: DateTime<Utc>,
}

/// Outcome of a renewal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewOutcome {
    /// Subscription was already open; nothing to do
    AlreadyOpen,
    /// A cancelled-but-unexpired subscription was reopened
    Reopened,
}

/// Billing service: gateway calls plus cycle bookkeeping.
pub struct BillingService {
    subscriptions: SubscriptionRepository,
    payments: PaymentRepository,
    kakao: KakaoPayClient,
}

impl BillingService {
    pub fn new(db: &Database, kakao: KakaoPayClient) -> Self {
        Self {
            subscriptions: SubscriptionRepository::new(db.pool().clone()),
            payments: PaymentRepository::new(db.pool().clone()),
            kakao,
        }
    }

    /// Start a payment. Returns the gateway redirect URL and the pending
    /// state the caller must hold until approval.
    pub async fn prepare(
        &self,
        user_id: &str,
        plan: PlanTier,
    ) -> BillingResult<(String, PendingPayment)> {
        let partner_order_id = Uuid::new_v4().to_string();
        let amount = plan.price_krw();

        let ready = self
            .kakao
            .ready(&partner_order_id, user_id, &plan.item_name(), amount)
            .await?;

        let pending = PendingPayment {
            partner_order_id,
            user_id: user_id.to_string(),
            plan,
            amount,
            tid: ready.tid,
        };

        Ok((ready.next_redirect_pc_url, pending))
    }

    /// Approve a payment and roll the billing cycle over.
    ///
    /// When a current subscription exists its cycle is closed (anchored
    /// on the most recent payment, never ending in the past) and the new
    /// cycle starts one second after that end; otherwise the new cycle
    /// starts now.
    pub async fn approve(
        &self,
        pending: &PendingPayment,
        pg_token: &str,
    ) -> BillingResult<Receipt> {
        let approve = self
            .kakao
            .approve(
                &pending.tid,
                &pending.partner_order_id,
                &pending.user_id,
                pg_token,
            )
            .await?;

        let now = Utc::now();
        let mut new_start = now;

        if let Some(current) = self
            .subscriptions
            .current_for_user(&pending.user_id, now)
            .await?
        {
            let cycle_end = match current.ended_at {
                Some(end) => end,
                None => {
                    let last_payment = self
                        .payments
                        .last_for_subscription(&current.subscription_id)
                        .await?;
                    let end = cycle::close_open_cycle(
                        current.started_at,
                        last_payment.map(|p| p.paid_at),
                        now,
                    );
                    self.subscriptions
                        .set_ended(&current.subscription_id, Some(end))
                        .await?;
                    end
                }
            };
            new_start = cycle::next_cycle_start(cycle_end);
        }

        let subscription = SubscriptionRecord::new(&pending.user_id, pending.plan, new_start);
        self.subscriptions.create(&subscription).await?;

        let payment = PaymentRecord::new(
            subscription.subscription_id.clone(),
            pending.amount,
            approve.sid,
            now,
        );
        self.payments.create(&payment).await?;

        info!(
            user_id = %pending.user_id,
            subscription_id = %subscription.subscription_id,
            plan = %pending.plan,
            "Subscription payment approved"
        );

        Ok(Receipt {
            subscription_id: subscription.subscription_id,
            plan_name: format!("{} plan", pending.plan.display_name()),
            amount: pending.amount,
            paid_at: now,
            cycle_started_at: new_start,
        })
    }

    /// Cancel the open subscription. Returns the expiration date.
    pub async fn cancel(&self, user_id: &str) -> BillingResult<DateTime<Utc>> {
        let open = self
            .subscriptions
            .open_for_user(user_id)
            .await?
            .ok_or_else(|| BillingError::no_subscription("nothing to cancel"))?;

        let now = Utc::now();
        let last_payment = self
            .payments
            .last_for_subscription(&open.subscription_id)
            .await?;

        let expiration =
            cycle::cancellation_end(open.started_at, last_payment.map(|p| p.paid_at), now);

        self.subscriptions
            .set_ended(&open.subscription_id, Some(expiration))
            .await?;

        info!(user_id = %user_id, expires = %expiration, "Subscription cancelled");
        Ok(expiration)
    }

    /// Renew a cancelled subscription by clearing its end date.
    ///
    /// No-op when a subscription is already open.
    pub async fn renew(&self, user_id: &str) -> BillingResult<RenewOutcome> {
        if self.subscriptions.open_for_user(user_id).await?.is_some() {
            return Ok(RenewOutcome::AlreadyOpen);
        }

        let now = Utc::now();
        let target = self
            .subscriptions
            .latest_renewable(user_id, now)
            .await?
            .ok_or_else(|| BillingError::no_subscription("nothing to renew"))?;

        self.subscriptions
            .set_ended(&target.subscription_id, None)
            .await?;

        info!(user_id = %user_id, subscription_id = %target.subscription_id, "Subscription renewed");
        Ok(RenewOutcome::Reopened)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kakao::KakaoConfig;
    use chrono::Duration;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn service_with_gateway(server: &MockServer) -> (BillingService, Database) {
        let db = Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();

        let kakao = KakaoPayClient::new(KakaoConfig {
            base_url: server.uri(),
            admin_key: "test-admin-key".to_string(),
            approval_url: "http://localhost/payments/approve/".to_string(),
            cancel_url: "http://localhost/payments/cancel/".to_string(),
            fail_url: "http://localhost/payments/fail/".to_string(),
        })
        .unwrap();

        (BillingService::new(&db, kakao), db)
    }

    async fn mock_approve(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/v1/payment/approve"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sid": "sid-test",
                "aid": "aid-test",
                "tid": "tid-test"
            })))
            .mount(server)
            .await;
    }

    fn pending(user_id: &str) -> PendingPayment {
        PendingPayment {
            partner_order_id: "order-1".to_string(),
            user_id: user_id.to_string(),
            plan: PlanTier::Basic,
            amount: PlanTier::Basic.price_krw(),
            tid: "tid-test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_first_approval_starts_cycle_now() {
        let server = MockServer::start().await;
        mock_approve(&server).await;
        let (service, db) = service_with_gateway(&server).await;

        let before = Utc::now();
        let receipt = service.approve(&pending("user-1"), "pg-token").await.unwrap();

        assert!(receipt.cycle_started_at >= before);
        assert_eq!(receipt.amount, PlanTier::Basic.price_krw());

        let subs = SubscriptionRepository::new(db.pool().clone());
        let open = subs.open_for_user("user-1").await.unwrap().unwrap();
        assert_eq!(open.subscription_id, receipt.subscription_id);
    }

    #[tokio::test]
    async fn test_approval_rolls_over_open_cycle() {
        let server = MockServer::start().await;
        mock_approve(&server).await;
        let (service, db) = service_with_gateway(&server).await;

        let subs = SubscriptionRepository::new(db.pool().clone());
        let payments = PaymentRepository::new(db.pool().clone());
        let now = Utc::now();

        // Open subscription paid 10 days ago
        let existing = SubscriptionRecord::new("user-1", PlanTier::Basic, now - Duration::days(10));
        subs.create(&existing).await.unwrap();
        payments
            .create(&PaymentRecord::new(
                existing.subscription_id.clone(),
                9_900,
                "sid-old",
                now - Duration::days(10),
            ))
            .await
            .unwrap();

        let receipt = service.approve(&pending("user-1"), "pg-token").await.unwrap();

        // The old cycle is closed 30 days after its payment...
        let closed = subs
            .latest_renewable("user-1", now)
            .await
            .unwrap()
            .expect("previous subscription should be closed but unexpired");
        assert_eq!(closed.subscription_id, existing.subscription_id);
        let closed_end = closed.ended_at.unwrap();

        // ...and the new cycle starts strictly after it
        assert!(receipt.cycle_started_at > closed_end);
        assert_eq!(receipt.cycle_started_at - closed_end, Duration::seconds(1));
    }

    #[tokio::test]
    async fn test_cancel_requires_open_subscription() {
        let server = MockServer::start().await;
        let (service, _db) = service_with_gateway(&server).await;

        let err = service.cancel("user-1").await.unwrap_err();
        assert!(matches!(err, BillingError::NoSubscription(_)));
    }

    #[tokio::test]
    async fn test_cancel_sets_cycle_expiration() {
        let server = MockServer::start().await;
        let (service, db) = service_with_gateway(&server).await;

        let subs = SubscriptionRepository::new(db.pool().clone());
        let now = Utc::now();
        let sub = SubscriptionRecord::new("user-1", PlanTier::Premium, now - Duration::days(3));
        subs.create(&sub).await.unwrap();

        let expiration = service.cancel("user-1").await.unwrap();
        assert_eq!(expiration, sub.started_at + Duration::days(30));
        assert!(subs.open_for_user("user-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_renew_is_idempotent_on_open_subscription() {
        let server = MockServer::start().await;
        let (service, db) = service_with_gateway(&server).await;

        let subs = SubscriptionRepository::new(db.pool().clone());
        let sub = SubscriptionRecord::new("user-1", PlanTier::Basic, Utc::now());
        subs.create(&sub).await.unwrap();

        assert_eq!(
            service.renew("user-1").await.unwrap(),
            RenewOutcome::AlreadyOpen
        );
        // Still exactly the same open subscription
        let open = subs.open_for_user("user-1").await.unwrap().unwrap();
        assert_eq!(open.subscription_id, sub.subscription_id);
    }

    #[tokio::test]
    async fn test_renew_reopens_cancelled_subscription() {
        let server = MockServer::start().await;
        let (service, db) = service_with_gateway(&server).await;

        let subs = SubscriptionRepository::new(db.pool().clone());
        let now = Utc::now();
        let mut sub = SubscriptionRecord::new("user-1", PlanTier::Basic, now - Duration::days(5));
        sub.ended_at = Some(now + Duration::days(25));
        subs.create(&sub).await.unwrap();

        assert_eq!(service.renew("user-1").await.unwrap(), RenewOutcome::Reopened);
        assert!(subs.open_for_user("user-1").await.unwrap().is_some());

        // No renewable target and nothing open -> error
        let mut expired = SubscriptionRecord::new("user-2", PlanTier::Basic, now - Duration::days(90));
        expired.ended_at = Some(now - Duration::days(60));
        subs.create(&expired).await.unwrap();
        assert!(matches!(
            service.renew("user-2").await.unwrap_err(),
            BillingError::NoSubscription(_)
        ));
    }
}
