//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::handlers::auth::{login, me, signup};
use crate::handlers::highlights::{list_highlights, play_highlight};
use crate::handlers::payments::{
    payment_approve, payment_cancel, payment_ready, payment_renew,
};
use crate::handlers::upload_status::get_processing_status;
use crate::handlers::uploads::{
    create_upload, delete_upload, download_upload, list_user_uploads, play_upload,
};
use crate::handlers::{health, ready};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let auth_routes = Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me));

    let upload_routes = Router::new()
        .route("/uploads", post(create_upload))
        .route("/uploads/:upload_id/play", get(play_upload))
        .route("/uploads/:upload_id/download", post(download_upload))
        .route("/uploads/:upload_id", delete(delete_upload))
        .route("/user/uploads", get(list_user_uploads))
        .route("/user/uploads/processing-status", get(get_processing_status));

    let highlight_routes = Router::new()
        .route("/highlights", get(list_highlights))
        .route("/highlights/:highlight_id/play", post(play_highlight));

    let payment_routes = Router::new()
        .route("/payments/ready", post(payment_ready))
        .route("/payments/approve", post(payment_approve))
        .route("/payments/cancel", post(payment_cancel))
        .route("/payments/renew", post(payment_renew));

    let rate_limiter = std::sync::Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));

    let api_routes = Router::new()
        .merge(auth_routes)
        .merge(upload_routes)
        .merge(highlight_routes)
        .merge(payment_routes)
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        // Body limit sized for video multipart uploads
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
