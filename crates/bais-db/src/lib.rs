//! SQLite persistence layer.
//!
//! Provides the connection pool with embedded schema migration and one
//! typed repository per aggregate (users, uploads, subtitles,
//! subscriptions/payments, highlights).

pub mod database;
pub mod error;
pub mod repos;
mod schema;

pub use database::Database;
pub use error::{DbError, DbResult};
pub use repos::{
    HighlightPage, HighlightQuery, HighlightRepository, HighlightSort, PaymentRepository,
    StatusSnapshot, SubscriptionRepository, SubtitleRepository, UploadRepository, UserRepository,
};
