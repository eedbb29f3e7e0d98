//! Billing error types.

use thiserror::Error;

pub type BillingResult<T> = Result<T, BillingError>;

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("Gateway configuration error: {0}")]
    ConfigError(String),

    #[error("Payment gateway rejected the request [{code}]: {message}")]
    Gateway { code: i64, message: String },

    #[error("Gateway response missing field: {0}")]
    InvalidResponse(String),

    #[error("No subscription to operate on: {0}")]
    NoSubscription(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Db(#[from] bais_db::DbError),
}

impl BillingError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn no_subscription(msg: impl Into<String>) -> Self {
        Self::NoSubscription(msg.into())
    }
}
