//! Upload repository.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::info;

use bais_models::{Analyst, UploadId, UploadRecord, UploadStatus};

use crate::error::{DbError, DbResult};

use super::parse_ts;

/// Point-in-time status of an upload, for batch polling.
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    pub upload_id: UploadId,
    pub status: Option<UploadStatus>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Repository for user uploads.
pub struct UploadRepository {
    pool: SqlitePool,
}

impl UploadRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new upload record.
    pub async fn create(&self, upload: &UploadRecord) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO uploads
                (upload_id, user_id, title, file_key, local_path, status_code,
                 analyst_code, download_count, active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(upload.upload_id.as_str())
        .bind(&upload.user_id)
        .bind(&upload.title)
        .bind(&upload.file_key)
        .bind(&upload.local_path)
        .bind(upload.status.code() as i64)
        .bind(upload.analyst.code() as i64)
        .bind(upload.download_count as i64)
        .bind(upload.active)
        .bind(upload.created_at.to_rfc3339())
        .bind(upload.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        info!(upload_id = %upload.upload_id, "Created upload record");
        Ok(())
    }

    /// Get an upload by id.
    pub async fn get(&self, upload_id: &UploadId) -> DbResult<Option<UploadRecord>> {
        let row = sqlx::query("SELECT * FROM uploads WHERE upload_id = ?")
            .bind(upload_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_upload).transpose()
    }

    /// Get an active upload owned by `user_id`.
    pub async fn get_for_user(
        &self,
        upload_id: &UploadId,
        user_id: &str,
    ) -> DbResult<Option<UploadRecord>> {
        let row = sqlx::query(
            "SELECT * FROM uploads WHERE upload_id = ? AND user_id = ? AND active = 1",
        )
        .bind(upload_id.as_str())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_upload).transpose()
    }

    /// List a user's active uploads, newest first.
    pub async fn list_active_for_user(&self, user_id: &str) -> DbResult<Vec<UploadRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM uploads
            WHERE user_id = ? AND active = 1
            ORDER BY created_at DESC, upload_id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_upload).collect()
    }

    /// Update the processing status.
    pub async fn update_status(&self, upload_id: &UploadId, status: UploadStatus) -> DbResult<()> {
        sqlx::query("UPDATE uploads SET status_code = ?, updated_at = ? WHERE upload_id = ?")
            .bind(status.code() as i64)
            .bind(Utc::now().to_rfc3339())
            .bind(upload_id.as_str())
            .execute(&self.pool)
            .await?;

        info!(upload_id = %upload_id, status = %status, "Updated upload status");
        Ok(())
    }

    /// Mark an upload completed and store the processed copy's path.
    pub async fn complete(&self, upload_id: &UploadId, local_path: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            UPDATE uploads SET status_code = ?, local_path = ?, updated_at = ?
            WHERE upload_id = ?
            "#,
        )
        .bind(UploadStatus::Completed.code() as i64)
        .bind(local_path)
        .bind(Utc::now().to_rfc3339())
        .bind(upload_id.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Atomically consume one download if under the cap.
    ///
    /// Returns the new count, or `None` when the cap was already reached.
    pub async fn try_increment_download(
        &self,
        upload_id: &UploadId,
        max_downloads: u32,
    ) -> DbResult<Option<u32>> {
        let result = sqlx::query(
            r#"
            UPDATE uploads SET download_count = download_count + 1, updated_at = ?
            WHERE upload_id = ? AND download_count < ?
            "#,
        )
        .bind(Utc::now().to_rfc3339())
        .bind(upload_id.as_str())
        .bind(max_downloads as i64)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let count: i64 =
            sqlx::query_scalar("SELECT download_count FROM uploads WHERE upload_id = ?")
                .bind(upload_id.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(Some(count.max(0) as u32))
    }

    /// Soft-delete an upload.
    pub async fn soft_delete(&self, upload_id: &UploadId, user_id: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE uploads SET active = 0, updated_at = ? WHERE upload_id = ? AND user_id = ? AND active = 1",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(upload_id.as_str())
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(format!("upload {}", upload_id)));
        }
        Ok(())
    }

    /// Batch status read for the polling endpoint. Uploads belonging to
    /// other users come back with an empty status.
    pub async fn status_snapshots(
        &self,
        user_id: &str,
        upload_ids: &[UploadId],
    ) -> DbResult<Vec<StatusSnapshot>> {
        let mut snapshots = Vec::with_capacity(upload_ids.len());

        for upload_id in upload_ids {
            let row = sqlx::query(
                "SELECT status_code, updated_at FROM uploads WHERE upload_id = ? AND user_id = ?",
            )
            .bind(upload_id.as_str())
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

            let (status, updated_at) = match row {
                Some(row) => {
                    let code = row.get::<i64, _>("status_code") as u8;
                    let updated_at = parse_ts(&row.get::<String, _>("updated_at"))?;
                    (UploadStatus::from_code(code), Some(updated_at))
                }
                None => (None, None),
            };

            snapshots.push(StatusSnapshot {
                upload_id: upload_id.clone(),
                status,
                updated_at,
            });
        }

        Ok(snapshots)
    }
}

fn row_to_upload(row: sqlx::sqlite::SqliteRow) -> DbResult<UploadRecord> {
    let status_code = row.get::<i64, _>("status_code") as u8;
    let status = UploadStatus::from_code(status_code)
        .ok_or_else(|| DbError::invalid_row(format!("unknown status code {}", status_code)))?;

    Ok(UploadRecord {
        upload_id: UploadId::from_string(row.get::<String, _>("upload_id")),
        user_id: row.get("user_id"),
        title: row.get("title"),
        file_key: row.get("file_key"),
        local_path: row.get("local_path"),
        status,
        analyst: Analyst::from_code(row.get::<i64, _>("analyst_code") as u16),
        download_count: row.get::<i64, _>("download_count").max(0) as u32,
        active: row.get("active"),
        created_at: parse_ts(&row.get::<String, _>("created_at"))?,
        updated_at: parse_ts(&row.get::<String, _>("updated_at"))?,
    })
}
