//! Upload intake, listing, playback, download and delete handlers.

use std::path::PathBuf;

use axum::extract::{Multipart, Path, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use bais_db::{SubscriptionRepository, SubtitleRepository, UploadRepository, UserRepository};
use bais_models::{
    format_bytes, Analyst, StorageUsage, UploadId, UploadRecord, UploadStatus, MAX_DOWNLOADS,
};
use bais_storage::keys;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

#[derive(Serialize)]
pub struct UploadAcceptedResponse {
    pub upload_id: String,
    pub status: String,
    pub message: String,
}

/// Accept a video upload and start the analysis pipeline.
///
/// Multipart fields: `video_file` (mp4), `video_title`, `commentator`.
pub async fn create_upload(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadAcceptedResponse>> {
    let mut file_name: Option<String> = None;
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut title = "Untitled".to_string();
    let mut analyst = Analyst::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "video_file" => {
                file_name = field.file_name().map(|s| s.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Upload read failed: {}", e)))?;
                file_bytes = Some(bytes.to_vec());
            }
            "video_title" => {
                title = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
            }
            "commentator" => {
                let name = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                analyst = Analyst::from_name(&name);
            }
            _ => {}
        }
    }

    let file_name = file_name.ok_or_else(|| ApiError::bad_request("video_file is required"))?;
    let file_bytes = file_bytes.ok_or_else(|| ApiError::bad_request("video_file is required"))?;

    if !file_name.to_lowercase().ends_with(".mp4") {
        return Err(ApiError::bad_request("Only MP4 files can be uploaded"));
    }

    // Quota check against the active plan
    let users = UserRepository::new(state.db.pool().clone());
    let subscriptions = SubscriptionRepository::new(state.db.pool().clone());
    let record = users
        .get(&user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    let active = subscriptions
        .current_for_user(&user.user_id, Utc::now())
        .await?
        .ok_or_else(|| ApiError::forbidden("An active subscription is required to upload"))?;

    let usage = StorageUsage::new(
        record.storage_used_bytes,
        active.plan.storage_limit_bytes(),
    );
    if usage.would_exceed(file_bytes.len() as u64) {
        return Err(ApiError::forbidden("Storage quota exceeded"));
    }

    // Stage the bytes to a temp file the pipeline consumes
    let staged_path = stage_bytes(&file_bytes).await?;

    let upload = UploadRecord::new(&user.user_id, title, keys::input_key(&file_name), analyst);

    let uploads = UploadRepository::new(state.db.pool().clone());
    uploads.create(&upload).await?;
    users
        .add_storage_used(&user.user_id, file_bytes.len() as i64)
        .await?;

    metrics::record_upload_accepted(upload.analyst.as_str());
    info!(
        upload_id = %upload.upload_id,
        user_id = %user.user_id,
        analyst = %upload.analyst,
        size = file_bytes.len(),
        "Upload accepted"
    );

    let upload_id = upload.upload_id.to_string();
    state.pipeline.clone().spawn(upload, staged_path);

    Ok(Json(UploadAcceptedResponse {
        upload_id,
        status: UploadStatus::Uploaded.as_str().to_string(),
        message: "Upload received, analysis is starting".to_string(),
    }))
}

async fn stage_bytes(bytes: &[u8]) -> ApiResult<PathBuf> {
    let file = tempfile::NamedTempFile::new()
        .map_err(|e| ApiError::internal(format!("Could not stage upload: {}", e)))?;
    let (_, path) = file
        .keep()
        .map_err(|e| ApiError::internal(format!("Could not stage upload: {}", e)))?;
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| ApiError::internal(format!("Could not stage upload: {}", e)))?;
    Ok(path)
}

#[derive(Serialize)]
pub struct UploadSummary {
    pub upload_id: String,
    pub title: String,
    pub status: String,
    pub status_code: u8,
    pub is_processing: bool,
    pub analyst: String,
    pub download_count: u32,
    pub downloads_remaining: u32,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct UserUploadsResponse {
    pub uploads: Vec<UploadSummary>,
    pub storage_used_bytes: u64,
    pub storage_limit_bytes: u64,
    pub storage_display: String,
    pub storage_used_percentage: f64,
}

/// List the user's active uploads with storage quota summary.
pub async fn list_user_uploads(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<UserUploadsResponse>> {
    let subscriptions = SubscriptionRepository::new(state.db.pool().clone());
    if !subscriptions.has_any_for_user(&user.user_id).await? {
        return Err(ApiError::forbidden("A subscription is required"));
    }

    let users = UserRepository::new(state.db.pool().clone());
    let record = users
        .get(&user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    let limit_bytes = subscriptions
        .current_for_user(&user.user_id, Utc::now())
        .await?
        .map(|s| s.plan.storage_limit_bytes())
        .unwrap_or(0);
    let usage = StorageUsage::new(record.storage_used_bytes, limit_bytes);

    let uploads = UploadRepository::new(state.db.pool().clone());
    let records = uploads.list_active_for_user(&user.user_id).await?;

    let summaries = records
        .into_iter()
        .map(|u| {
            let downloads_remaining = u.downloads_remaining();
            UploadSummary {
                upload_id: u.upload_id.to_string(),
                title: u.title,
                status: u.status.as_str().to_string(),
                status_code: u.status.code(),
                is_processing: !matches!(u.status, UploadStatus::Completed),
                analyst: u.analyst.display_name().to_string(),
                download_count: u.download_count,
                downloads_remaining,
                created_at: u.created_at.to_rfc3339(),
            }
        })
        .collect();

    Ok(Json(UserUploadsResponse {
        uploads: summaries,
        storage_used_bytes: usage.used_bytes,
        storage_limit_bytes: usage.limit_bytes,
        storage_display: format!(
            "{} / {}",
            format_bytes(usage.used_bytes),
            format_bytes(usage.limit_bytes)
        ),
        storage_used_percentage: usage.percentage(),
    }))
}

#[derive(Serialize)]
pub struct UploadPlayResponse {
    pub upload_id: String,
    pub title: String,
    pub file_path: String,
    pub analyst: String,
    pub subtitles: serde_json::Value,
}

/// Playback context for a processed upload, subtitles included.
pub async fn play_upload(
    State(state): State<AppState>,
    Path(upload_id): Path<String>,
    user: AuthUser,
) -> ApiResult<Json<UploadPlayResponse>> {
    let upload_id = UploadId::from_string(upload_id);
    let uploads = UploadRepository::new(state.db.pool().clone());

    let upload = uploads
        .get_for_user(&upload_id, &user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Upload"))?;

    let subtitles = SubtitleRepository::new(state.db.pool().clone());
    let script = match subtitles.get_for_upload(&upload_id).await? {
        Some(record) => record
            .script()
            .unwrap_or_else(|_| serde_json::Value::Array(vec![])),
        None => serde_json::Value::Array(vec![]),
    };

    let file_path = upload.local_path.clone().unwrap_or(upload.file_key.clone());

    Ok(Json(UploadPlayResponse {
        upload_id: upload.upload_id.to_string(),
        title: upload.title,
        file_path,
        analyst: upload.analyst.display_name().to_string(),
        subtitles: script,
    }))
}

#[derive(Serialize)]
pub struct DownloadResponse {
    pub file_path: String,
    pub current_count: u32,
    pub remaining_count: u32,
}

/// Consume one download of a processed upload (capped at 10).
pub async fn download_upload(
    State(state): State<AppState>,
    Path(upload_id): Path<String>,
    user: AuthUser,
) -> ApiResult<Json<DownloadResponse>> {
    let upload_id = UploadId::from_string(upload_id);
    let uploads = UploadRepository::new(state.db.pool().clone());

    let upload = uploads
        .get_for_user(&upload_id, &user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Upload"))?;

    let count = uploads
        .try_increment_download(&upload_id, MAX_DOWNLOADS)
        .await?
        .ok_or(ApiError::DownloadLimitExceeded)?;

    metrics::record_download_served();

    Ok(Json(DownloadResponse {
        file_path: upload.local_path.unwrap_or(upload.file_key),
        current_count: count,
        remaining_count: MAX_DOWNLOADS.saturating_sub(count),
    }))
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// Soft-delete an upload.
pub async fn delete_upload(
    State(state): State<AppState>,
    Path(upload_id): Path<String>,
    user: AuthUser,
) -> ApiResult<Json<DeleteResponse>> {
    let upload_id = UploadId::from_string(upload_id);
    let uploads = UploadRepository::new(state.db.pool().clone());

    uploads
        .soft_delete(&upload_id, &user.user_id)
        .await
        .map_err(|e| match e {
            bais_db::DbError::NotFound(_) => ApiError::not_found("Upload"),
            other => other.into(),
        })?;

    info!(upload_id = %upload_id, user_id = %user.user_id, "Upload deleted");
    Ok(Json(DeleteResponse { deleted: true }))
}
