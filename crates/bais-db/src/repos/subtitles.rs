//! Subtitle repository.

use sqlx::{Row, SqlitePool};
use tracing::info;

use bais_models::{Analyst, SubtitleRecord, UploadId};

use crate::error::{DbError, DbResult};

use super::parse_ts;

/// Repository for subtitle records.
pub struct SubtitleRepository {
    pool: SqlitePool,
}

impl SubtitleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a subtitle record. The 1:1 constraint with the upload is
    /// enforced by the schema; a second insert for the same upload fails.
    pub async fn create(&self, subtitle: &SubtitleRecord) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO subtitles (subtitle_id, upload_id, analyst_code, payload, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&subtitle.subtitle_id)
        .bind(subtitle.upload_id.as_str())
        .bind(subtitle.analyst.code() as i64)
        .bind(&subtitle.payload)
        .bind(subtitle.created_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                info!(upload_id = %subtitle.upload_id, "Stored subtitle payload");
                Ok(())
            }
            Err(e) if e.to_string().contains("UNIQUE") => Err(DbError::Duplicate(format!(
                "subtitle for upload {}",
                subtitle.upload_id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Get the subtitle attached to an upload, if any.
    pub async fn get_for_upload(&self, upload_id: &UploadId) -> DbResult<Option<SubtitleRecord>> {
        let row = sqlx::query("SELECT * FROM subtitles WHERE upload_id = ?")
            .bind(upload_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| {
            Ok(SubtitleRecord {
                subtitle_id: row.get("subtitle_id"),
                upload_id: UploadId::from_string(row.get::<String, _>("upload_id")),
                analyst: Analyst::from_code(row.get::<i64, _>("analyst_code") as u16),
                payload: row.get("payload"),
                created_at: parse_ts(&row.get::<String, _>("created_at"))?,
            })
        })
        .transpose()
    }
}
