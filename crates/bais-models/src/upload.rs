//! Upload records and processing status.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::Analyst;

/// Maximum downloads allowed per processed upload.
pub const MAX_DOWNLOADS: u32 = 10;

/// Unique identifier for a user upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct UploadId(pub String);

impl UploadId {
    /// Generate a new random upload ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UploadId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UploadId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UploadId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Processing status of an upload.
///
/// The numeric codes are the wire/DB representation shared with the
/// legacy status-code table (STATUS group, 20-23).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    /// Received, analysis not yet started
    #[default]
    Uploaded,
    /// Submitted to the analysis service
    Processing,
    /// Analysis finished, processed asset and subtitles available
    Completed,
    /// Analysis failed or timed out
    Failed,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Uploaded => "uploaded",
            UploadStatus::Processing => "processing",
            UploadStatus::Completed => "completed",
            UploadStatus::Failed => "failed",
        }
    }

    /// Numeric status code (legacy common-code table).
    pub fn code(&self) -> u8 {
        match self {
            UploadStatus::Uploaded => 20,
            UploadStatus::Processing => 21,
            UploadStatus::Completed => 22,
            UploadStatus::Failed => 23,
        }
    }

    /// Parse a numeric status code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            20 => Some(UploadStatus::Uploaded),
            21 => Some(UploadStatus::Processing),
            22 => Some(UploadStatus::Completed),
            23 => Some(UploadStatus::Failed),
            _ => None,
        }
    }

    /// Reconcile a raw status string reported by the analysis service.
    ///
    /// `COMPLETED`/`SUCCESS` map to [`UploadStatus::Completed`],
    /// `FAILED` to [`UploadStatus::Failed`]. Any other value means the
    /// job is still in flight and maps to `None`.
    pub fn from_remote(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "COMPLETED" | "SUCCESS" => Some(UploadStatus::Completed),
            "FAILED" => Some(UploadStatus::Failed),
            _ => None,
        }
    }

    /// Check if this is a terminal state (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadStatus::Completed | UploadStatus::Failed)
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user-submitted video upload.
///
/// Uploads are never hard-deleted; `active` flips to `false` on delete.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UploadRecord {
    /// Unique upload ID
    pub upload_id: UploadId,

    /// Owning user ID
    pub user_id: String,

    /// Title supplied at upload time
    pub title: String,

    /// Object storage key of the source asset
    pub file_key: String,

    /// Relative path of the processed copy under the media root
    /// (set once analysis completes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,

    /// Processing status
    #[serde(default)]
    pub status: UploadStatus,

    /// Selected commentary analyst
    pub analyst: Analyst,

    /// Number of downloads consumed (hard cap [`MAX_DOWNLOADS`])
    #[serde(default)]
    pub download_count: u32,

    /// Soft-delete flag
    #[serde(default = "default_active")]
    pub active: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl UploadRecord {
    /// Create a new upload record in the `Uploaded` state.
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        file_key: impl Into<String>,
        analyst: Analyst,
    ) -> Self {
        let now = Utc::now();
        Self {
            upload_id: UploadId::new(),
            user_id: user_id.into(),
            title: title.into(),
            file_key: file_key.into(),
            local_path: None,
            status: UploadStatus::Uploaded,
            analyst,
            download_count: 0,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark the upload as submitted for analysis.
    pub fn start_processing(mut self) -> Self {
        self.status = UploadStatus::Processing;
        self.updated_at = Utc::now();
        self
    }

    /// Mark the upload as completed with the processed copy's path.
    pub fn complete(mut self, local_path: impl Into<String>) -> Self {
        self.status = UploadStatus::Completed;
        self.local_path = Some(local_path.into());
        self.updated_at = Utc::now();
        self
    }

    /// Mark the upload as failed.
    pub fn fail(mut self) -> Self {
        self.status = UploadStatus::Failed;
        self.updated_at = Utc::now();
        self
    }

    /// Whether another download is permitted.
    pub fn can_download(&self) -> bool {
        self.download_count < MAX_DOWNLOADS
    }

    /// Downloads remaining before the cap.
    pub fn downloads_remaining(&self) -> u32 {
        MAX_DOWNLOADS.saturating_sub(self.download_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_round_trip() {
        for status in [
            UploadStatus::Uploaded,
            UploadStatus::Processing,
            UploadStatus::Completed,
            UploadStatus::Failed,
        ] {
            assert_eq!(UploadStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(UploadStatus::from_code(42), None);
    }

    #[test]
    fn test_remote_status_reconciliation() {
        assert_eq!(
            UploadStatus::from_remote("COMPLETED"),
            Some(UploadStatus::Completed)
        );
        assert_eq!(
            UploadStatus::from_remote("success"),
            Some(UploadStatus::Completed)
        );
        assert_eq!(
            UploadStatus::from_remote("Failed"),
            Some(UploadStatus::Failed)
        );
        // Non-terminal statuses keep the loop polling
        assert_eq!(UploadStatus::from_remote("IN_PROGRESS"), None);
        assert_eq!(UploadStatus::from_remote("IN_QUEUE"), None);
        assert_eq!(UploadStatus::from_remote(""), None);
    }

    #[test]
    fn test_upload_transitions() {
        let upload = UploadRecord::new("user-1", "Ninth inning rally", "inputs/rally.mp4", Analyst::default());
        assert_eq!(upload.status, UploadStatus::Uploaded);
        assert!(upload.active);

        let processing = upload.start_processing();
        assert_eq!(processing.status, UploadStatus::Processing);
        assert!(!processing.status.is_terminal());

        let completed = processing.complete("videos/2025/06/01/processed_1_rally.mp4");
        assert_eq!(completed.status, UploadStatus::Completed);
        assert!(completed.status.is_terminal());
        assert!(completed.local_path.is_some());
    }

    #[test]
    fn test_download_cap() {
        let mut upload = UploadRecord::new("user-1", "t", "inputs/t.mp4", Analyst::default());
        upload.download_count = MAX_DOWNLOADS - 1;
        assert!(upload.can_download());
        assert_eq!(upload.downloads_remaining(), 1);

        upload.download_count = MAX_DOWNLOADS;
        assert!(!upload.can_download());
        assert_eq!(upload.downloads_remaining(), 0);
    }
}
