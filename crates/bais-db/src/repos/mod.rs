//! Typed repositories, one per aggregate.

use chrono::{DateTime, Utc};

use crate::error::{DbError, DbResult};

mod highlights;
mod subscriptions;
mod subtitles;
mod uploads;
mod users;

pub use highlights::{HighlightPage, HighlightQuery, HighlightRepository, HighlightSort};
pub use subscriptions::{PaymentRepository, SubscriptionRepository};
pub use subtitles::SubtitleRepository;
pub use uploads::{StatusSnapshot, UploadRepository};
pub use users::UserRepository;

/// Parse a stored RFC 3339 timestamp.
pub(crate) fn parse_ts(raw: &str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::invalid_row(format!("bad timestamp {:?}: {}", raw, e)))
}

/// Parse an optional stored RFC 3339 timestamp.
pub(crate) fn parse_ts_opt(raw: Option<&str>) -> DbResult<Option<DateTime<Utc>>> {
    raw.map(parse_ts).transpose()
}
