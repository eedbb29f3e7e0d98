//! Batch processing-status polling endpoint.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use bais_db::UploadRepository;
use bais_models::UploadId;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const MAX_STATUS_IDS: usize = 100;

#[derive(Deserialize)]
pub struct ProcessingStatusQuery {
    pub ids: Option<String>,
}

#[derive(Serialize)]
pub struct ProcessingStatusEntry {
    pub upload_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Serialize)]
pub struct ProcessingStatusResponse {
    pub uploads: Vec<ProcessingStatusEntry>,
}

/// Get processing status for specific upload IDs (batch read).
pub async fn get_processing_status(
    State(state): State<AppState>,
    Query(query): Query<ProcessingStatusQuery>,
    user: AuthUser,
) -> ApiResult<Json<ProcessingStatusResponse>> {
    let ids = parse_ids(&query.ids)?;
    validate_ids(&ids)?;

    info!(
        "get_processing_status user_id={} ids_count={}",
        user.user_id,
        ids.len()
    );

    let uploads = UploadRepository::new(state.db.pool().clone());
    let upload_ids: Vec<UploadId> = ids.into_iter().map(UploadId::from_string).collect();
    let snapshots = uploads.status_snapshots(&user.user_id, &upload_ids).await?;

    let entries = snapshots
        .into_iter()
        .map(|s| ProcessingStatusEntry {
            upload_id: s.upload_id.to_string(),
            status: s.status.map(|st| st.as_str().to_string()),
            status_code: s.status.map(|st| st.code()),
            updated_at: s.updated_at.map(|dt| dt.to_rfc3339()),
        })
        .collect();

    Ok(Json(ProcessingStatusResponse { uploads: entries }))
}

fn parse_ids(ids_param: &Option<String>) -> ApiResult<Vec<String>> {
    let ids: Vec<String> = ids_param
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if ids.is_empty() {
        return Err(ApiError::bad_request("ids query param is required"));
    }
    if ids.len() > MAX_STATUS_IDS {
        return Err(ApiError::bad_request(format!(
            "Cannot query more than {} ids",
            MAX_STATUS_IDS
        )));
    }

    Ok(ids)
}

fn validate_ids(ids: &[String]) -> ApiResult<()> {
    for id in ids {
        if !is_valid_upload_id(id) {
            return Err(ApiError::bad_request("Invalid upload ID format"));
        }
    }
    Ok(())
}

/// Validate upload ID format to prevent injection.
///
/// Valid format: alphanumeric characters and hyphens only, 8-64 chars.
pub fn is_valid_upload_id(id: &str) -> bool {
    if id.len() > 64 || id.len() < 8 {
        return false;
    }
    id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
