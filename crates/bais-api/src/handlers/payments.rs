//! Subscription payment handlers.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use bais_billing::RenewOutcome;
use bais_models::PlanTier;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ReadyRequest {
    /// Plan code: "basic" or "premium"
    pub plan: String,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub order_id: String,
    /// Gateway URL the user must visit to authorize the payment
    pub redirect_url: String,
}

/// Start a subscription payment.
pub async fn payment_ready(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ReadyRequest>,
) -> ApiResult<Json<ReadyResponse>> {
    let plan = PlanTier::from_str(&request.plan);

    let (redirect_url, pending) = state.billing.prepare(&user.user_id, plan).await?;
    let order_id = pending.partner_order_id.clone();

    state
        .pending_payments
        .write()
        .await
        .insert(order_id.clone(), pending);

    info!(user_id = %user.user_id, order_id = %order_id, plan = %plan, "Payment ready");
    Ok(Json(ReadyResponse {
        order_id,
        redirect_url,
    }))
}

#[derive(Deserialize)]
pub struct ApproveRequest {
    pub order_id: String,
    pub pg_token: String,
}

#[derive(Serialize)]
pub struct ApproveResponse {
    pub subscription_id: String,
    pub plan_name: String,
    pub amount: u32,
    pub payment_date: String,
}

/// Approve a payment the user authorized at the gateway.
pub async fn payment_approve(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ApproveRequest>,
) -> ApiResult<Json<ApproveResponse>> {
    let pending = state
        .pending_payments
        .write()
        .await
        .remove(&request.order_id)
        .ok_or_else(|| ApiError::not_found("Pending payment session"))?;

    if pending.user_id != user.user_id {
        return Err(ApiError::forbidden("Payment session belongs to another user"));
    }

    let receipt = state.billing.approve(&pending, &request.pg_token).await?;
    metrics::record_payment_approved(pending.plan.as_str());

    Ok(Json(ApproveResponse {
        subscription_id: receipt.subscription_id,
        plan_name: receipt.plan_name,
        amount: receipt.amount,
        payment_date: receipt.paid_at.format("%Y.%m.%d").to_string(),
    }))
}

#[derive(Serialize)]
pub struct CancelResponse {
    /// Date the subscription stops being usable
    pub expires_at: String,
}

/// Cancel the open subscription at the end of its paid cycle.
pub async fn payment_cancel(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<CancelResponse>> {
    let expiration = state.billing.cancel(&user.user_id).await?;
    metrics::record_subscription_change("cancel");

    Ok(Json(CancelResponse {
        expires_at: expiration.format("%Y.%m.%d").to_string(),
    }))
}

#[derive(Serialize)]
pub struct RenewResponse {
    pub renewed: bool,
    pub outcome: String,
}

/// Reopen a cancelled subscription (no-op when already open).
pub async fn payment_renew(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<RenewResponse>> {
    let outcome = state.billing.renew(&user.user_id).await?;
    metrics::record_subscription_change("renew");

    let (renewed, outcome) = match outcome {
        RenewOutcome::Reopened => (true, "reopened"),
        RenewOutcome::AlreadyOpen => (false, "already_open"),
    };

    Ok(Json(RenewResponse {
        renewed,
        outcome: outcome.to_string(),
    }))
}
