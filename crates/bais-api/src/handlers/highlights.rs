//! Highlight catalog browsing and playback.

use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use bais_db::{
    HighlightQuery, HighlightRepository, HighlightSort, SubscriptionRepository, UserRepository,
};
use bais_models::HighlightCategory;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u32 = 8;
const MAX_PAGE_SIZE: u32 = 50;

/// Expiry for highlight playback URLs.
const PLAYBACK_URL_EXPIRY: Duration = Duration::from_secs(3600);

#[derive(Deserialize)]
pub struct ListHighlightsQuery {
    pub category: Option<String>,
    pub q: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Serialize)]
pub struct HighlightSummary {
    pub highlight_id: String,
    pub title: String,
    pub category: String,
    pub match_date: String,
}

#[derive(Serialize)]
pub struct HighlightListResponse {
    pub highlights: Vec<HighlightSummary>,
    pub has_next: bool,
}

/// Browse or search the highlight catalog.
pub async fn list_highlights(
    State(state): State<AppState>,
    Query(query): Query<ListHighlightsQuery>,
    _user: AuthUser,
) -> ApiResult<Json<HighlightListResponse>> {
    let category = match &query.category {
        Some(raw) => Some(
            HighlightCategory::from_str(raw)
                .ok_or_else(|| ApiError::bad_request("Unknown highlight category"))?,
        ),
        None => None,
    };

    let page_size = query
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let repo = HighlightRepository::new(state.db.pool().clone());
    let page = repo
        .list(&HighlightQuery {
            category,
            search: query.q.clone().filter(|s| !s.is_empty()),
            sort: HighlightSort::from_str(query.sort.as_deref().unwrap_or("latest")),
            page: query.page.unwrap_or(1),
            page_size,
        })
        .await?;

    let highlights = page
        .highlights
        .into_iter()
        .map(|h| HighlightSummary {
            highlight_id: h.highlight_id,
            title: h.title,
            category: h.category.as_str().to_string(),
            match_date: h.match_date.to_rfc3339(),
        })
        .collect();

    Ok(Json(HighlightListResponse {
        highlights,
        has_next: page.has_next,
    }))
}

#[derive(Serialize)]
pub struct HighlightPlayResponse {
    pub highlight_id: String,
    pub title: String,
    pub match_date: String,
    /// Short-lived presigned playback URL
    pub url: String,
}

/// Playback context for a highlight.
///
/// Users without any subscription history get exactly one free play;
/// after that the trial sentinel is returned.
pub async fn play_highlight(
    State(state): State<AppState>,
    Path(highlight_id): Path<String>,
    user: AuthUser,
) -> ApiResult<Json<HighlightPlayResponse>> {
    let subscriptions = SubscriptionRepository::new(state.db.pool().clone());
    let users = UserRepository::new(state.db.pool().clone());

    let has_history = subscriptions.has_any_for_user(&user.user_id).await?;
    if !has_history {
        let record = users
            .get(&user.user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User"))?;

        if record.free_play_used {
            return Err(ApiError::TrialExpired);
        }
        users.set_free_play_used(&user.user_id).await?;
        info!(user_id = %user.user_id, "Free trial play consumed");
    }

    let repo = HighlightRepository::new(state.db.pool().clone());
    let highlight = repo
        .get(&highlight_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Highlight"))?;

    let url = state
        .storage
        .presign_get(&highlight.file_key, PLAYBACK_URL_EXPIRY)
        .await?;

    Ok(Json(HighlightPlayResponse {
        highlight_id: highlight.highlight_id,
        title: highlight.title,
        match_date: highlight.match_date.to_rfc3339(),
        url,
    }))
}
