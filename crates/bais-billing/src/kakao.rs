//! Kakao Pay REST client (ready/approve).

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{BillingError, BillingResult};

/// CID registered for recurring subscription payments.
const SUBSCRIPTION_CID: &str = "TCSUBSCRIP";

/// Content type the gateway requires, charset included.
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=utf-8";

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct KakaoConfig {
    /// Gateway base URL
    pub base_url: String,
    /// Admin key used as bearer credential
    pub admin_key: String,
    /// Redirect URL on user approval
    pub approval_url: String,
    /// Redirect URL on user cancel
    pub cancel_url: String,
    /// Redirect URL on failure
    pub fail_url: String,
}

impl KakaoConfig {
    /// Create config from environment variables.
    pub fn from_env() -> BillingResult<Self> {
        let base_url = std::env::var("KAKAO_API_BASE_URL")
            .unwrap_or_else(|_| "https://kapi.kakao.com".to_string());
        let admin_key = std::env::var("KAKAO_ADMIN_KEY")
            .map_err(|_| BillingError::config_error("KAKAO_ADMIN_KEY not set"))?;
        let redirect_base = std::env::var("PAYMENT_REDIRECT_BASE")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());

        Ok(Self {
            base_url,
            admin_key,
            approval_url: format!("{}/payments/approve/", redirect_base),
            cancel_url: format!("{}/payments/cancel/", redirect_base),
            fail_url: format!("{}/payments/fail/", redirect_base),
        })
    }
}

/// Response to a payment-ready request.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadyResponse {
    pub tid: String,
    pub next_redirect_pc_url: String,
}

/// Response to a payment-approve request.
#[derive(Debug, Clone, Deserialize)]
pub struct ApproveResponse {
    /// Billing key / transaction id for the recurring payment
    pub sid: String,
    #[serde(default)]
    pub aid: Option<String>,
    #[serde(default)]
    pub tid: Option<String>,
}

/// Error payload returned by the gateway.
#[derive(Debug, Deserialize)]
struct GatewayError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    msg: String,
}

/// Kakao Pay REST client.
pub struct KakaoPayClient {
    http: Client,
    config: KakaoConfig,
}

impl KakaoPayClient {
    /// Create a new gateway client.
    pub fn new(config: KakaoConfig) -> BillingResult<Self> {
        let http = Client::builder().build().map_err(BillingError::Network)?;
        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> BillingResult<Self> {
        Self::new(KakaoConfig::from_env()?)
    }

    /// Start a payment: returns the tid and the redirect URL the user
    /// must visit to authorize.
    pub async fn ready(
        &self,
        partner_order_id: &str,
        partner_user_id: &str,
        item_name: &str,
        total_amount: u32,
    ) -> BillingResult<ReadyResponse> {
        let url = format!("{}/v1/payment/ready", self.config.base_url);
        let amount = total_amount.to_string();

        let params = [
            ("cid", SUBSCRIPTION_CID),
            ("partner_order_id", partner_order_id),
            ("partner_user_id", partner_user_id),
            ("item_name", item_name),
            ("quantity", "1"),
            ("total_amount", amount.as_str()),
            ("tax_free_amount", "0"),
            ("approval_url", self.config.approval_url.as_str()),
            ("cancel_url", self.config.cancel_url.as_str()),
            ("fail_url", self.config.fail_url.as_str()),
        ];

        debug!(order_id = %partner_order_id, item = %item_name, "Kakao payment ready");

        let response = self
            .http
            .post(&url)
            .form(&params)
            .header("Authorization", format!("KakaoAK {}", self.config.admin_key))
            .header("Content-type", FORM_CONTENT_TYPE)
            .send()
            .await?;

        if !response.status().is_success() {
            let err: GatewayError = response.json().await.unwrap_or(GatewayError {
                code: -1,
                msg: "unparseable gateway error".to_string(),
            });
            return Err(BillingError::Gateway {
                code: err.code,
                message: err.msg,
            });
        }

        // A success body without the redirect URL is still unusable
        let body: serde_json::Value = response.json().await?;
        if body.get("next_redirect_pc_url").and_then(|v| v.as_str()).is_none() {
            return Err(BillingError::InvalidResponse(
                "next_redirect_pc_url".to_string(),
            ));
        }

        let ready: ReadyResponse = serde_json::from_value(body)
            .map_err(|e| BillingError::InvalidResponse(e.to_string()))?;

        info!(tid = %ready.tid, "Kakao payment ready accepted");
        Ok(ready)
    }

    /// Approve a payment after the user authorized it (pg_token from the
    /// redirect).
    pub async fn approve(
        &self,
        tid: &str,
        partner_order_id: &str,
        partner_user_id: &str,
        pg_token: &str,
    ) -> BillingResult<ApproveResponse> {
        let url = format!("{}/v1/payment/approve", self.config.base_url);

        let params = [
            ("cid", SUBSCRIPTION_CID),
            ("tid", tid),
            ("partner_order_id", partner_order_id),
            ("partner_user_id", partner_user_id),
            ("pg_token", pg_token),
        ];

        debug!(tid = %tid, order_id = %partner_order_id, "Kakao payment approve");

        let response = self
            .http
            .post(&url)
            .form(&params)
            .header("Authorization", format!("KakaoAK {}", self.config.admin_key))
            .header("Content-type", FORM_CONTENT_TYPE)
            .send()
            .await?;

        if !response.status().is_success() {
            let err: GatewayError = response.json().await.unwrap_or(GatewayError {
                code: -1,
                msg: "unparseable gateway error".to_string(),
            });
            return Err(BillingError::Gateway {
                code: err.code,
                message: err.msg,
            });
        }

        let approve: ApproveResponse = response
            .json()
            .await
            .map_err(|e| BillingError::InvalidResponse(e.to_string()))?;

        info!(sid = %approve.sid, "Kakao payment approved");
        Ok(approve)
    }
}
