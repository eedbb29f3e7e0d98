//! Signup, login and profile handlers.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use bais_db::{SubscriptionRepository, UserRepository};
use bais_models::{Team, UserRecord};

use crate::auth::{hash_password, verify_password, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    /// Favorite KBO team code (e.g. "LOTTE")
    pub favorite_team: Option<String>,
}

#[derive(Serialize)]
pub struct SignupResponse {
    pub user_id: String,
}

/// Create a new account.
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> ApiResult<Json<SignupResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let favorite_team = match &request.favorite_team {
        Some(code) => Some(
            Team::from_str(code).ok_or_else(|| ApiError::bad_request("Unknown team code"))?,
        ),
        None => None,
    };

    let user = UserRecord::new(
        request.email.to_lowercase(),
        hash_password(&request.password),
        favorite_team,
    );

    let users = UserRepository::new(state.db.pool().clone());
    users.create(&user).await.map_err(|e| match e {
        bais_db::DbError::Duplicate(_) => ApiError::Conflict("Email already registered".into()),
        other => other.into(),
    })?;

    info!(user_id = %user.user_id, "User signed up");
    Ok(Json(SignupResponse {
        user_id: user.user_id,
    }))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
}

/// Log in, returning a bearer session token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let users = UserRepository::new(state.db.pool().clone());

    let user = users
        .get_by_email(&request.email.to_lowercase())
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    if !verify_password(&request.password, &user.password_hash) {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let token = state.sessions.sign(&user.user_id);
    info!(user_id = %user.user_id, "User logged in");

    Ok(Json(LoginResponse {
        token,
        user_id: user.user_id,
    }))
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub user_id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite_team: Option<String>,
    pub free_play_used: bool,
    pub has_subscription_history: bool,
}

/// Current user profile.
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ProfileResponse>> {
    let users = UserRepository::new(state.db.pool().clone());
    let subscriptions = SubscriptionRepository::new(state.db.pool().clone());

    let record = users
        .get(&user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;
    let has_history = subscriptions.has_any_for_user(&user.user_id).await?;

    Ok(Json(ProfileResponse {
        user_id: record.user_id,
        email: record.email,
        favorite_team: record.favorite_team.map(|t| t.as_str().to_string()),
        free_play_used: record.free_play_used,
        has_subscription_history: has_history,
    }))
}
