//! Session tokens and request authentication.
//!
//! Sessions are HMAC-SHA256 signed bearer tokens:
//! `base64url(user_id:expiry_unix) . base64url(signature)`.
//! Passwords are stored as `salt$sha256(salt + password)` hex digests.

use std::time::Duration;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::error::ApiError;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies session tokens.
#[derive(Clone)]
pub struct SessionSigner {
    secret: Vec<u8>,
    ttl: Duration,
}

impl SessionSigner {
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    /// Issue a token for a user.
    pub fn sign(&self, user_id: &str) -> String {
        let expiry = Utc::now().timestamp() + self.ttl.as_secs() as i64;
        let payload = format!("{}:{}", user_id, expiry);

        let mut mac = HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key size");
        mac.update(payload.as_bytes());
        let signature = mac.finalize().into_bytes();

        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(payload.as_bytes()),
            URL_SAFE_NO_PAD.encode(signature)
        )
    }

    /// Verify a token, returning the user id.
    pub fn verify(&self, token: &str) -> Result<String, ApiError> {
        let (payload_b64, signature_b64) = token
            .split_once('.')
            .ok_or_else(|| ApiError::unauthorized("Malformed session token"))?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| ApiError::unauthorized("Malformed session token"))?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| ApiError::unauthorized("Malformed session token"))?;

        let mut mac = HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key size");
        mac.update(&payload);
        mac.verify_slice(&signature)
            .map_err(|_| ApiError::unauthorized("Invalid session signature"))?;

        let payload = String::from_utf8(payload)
            .map_err(|_| ApiError::unauthorized("Malformed session token"))?;
        let (user_id, expiry) = payload
            .rsplit_once(':')
            .ok_or_else(|| ApiError::unauthorized("Malformed session token"))?;

        let expiry: i64 = expiry
            .parse()
            .map_err(|_| ApiError::unauthorized("Malformed session token"))?;
        if expiry < Utc::now().timestamp() {
            return Err(ApiError::unauthorized("Session expired"));
        }

        Ok(user_id.to_string())
    }
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let salt = uuid::Uuid::new_v4().simple().to_string();
    format!("{}${}", salt, digest_with_salt(&salt, password))
}

/// Verify a password against a stored `salt$digest` value.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, digest)) => digest_with_salt(salt, password) == digest,
        None => false,
    }
}

fn digest_with_salt(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Authenticated user extracted from the bearer session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Expected bearer token"))?;

        let user_id = state.sessions.verify(token)?;
        Ok(AuthUser { user_id })
    }
}
