//! Subscription billing.
//!
//! Wraps the Kakao Pay REST gateway (ready/approve) and implements the
//! 30-day cycle bookkeeping: rollover on approval, cancellation and
//! renewal.

pub mod error;
pub mod kakao;
pub mod service;

pub use error::{BillingError, BillingResult};
pub use kakao::{ApproveResponse, KakaoConfig, KakaoPayClient, ReadyResponse};
pub use service::{BillingService, PendingPayment, Receipt, RenewOutcome};
