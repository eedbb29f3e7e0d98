//! Shared data models for the BAIS backend.
//!
//! This crate provides Serde-serializable types for:
//! - Uploads and their processing status
//! - Commentary analysts and subtitle payloads
//! - Subscriptions, payments and billing cycles
//! - Highlight catalog entries
//! - Plan tiers and storage accounting

pub mod analyst;
pub mod cycle;
pub mod highlight;
pub mod plan;
pub mod subscription;
pub mod subtitle;
pub mod upload;
pub mod user;

// Re-export common types
pub use analyst::Analyst;
pub use highlight::{HighlightCategory, HighlightRecord};
pub use plan::{format_bytes, PlanTier, StorageUsage};
pub use subscription::{PaymentRecord, SubscriptionRecord};
pub use subtitle::SubtitleRecord;
pub use upload::{UploadId, UploadRecord, UploadStatus, MAX_DOWNLOADS};
pub use user::{Team, UserRecord};
