//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "bais_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "bais_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "bais_http_requests_in_flight";

    // Upload pipeline metrics
    pub const UPLOADS_ACCEPTED_TOTAL: &str = "bais_uploads_accepted_total";
    pub const DOWNLOADS_SERVED_TOTAL: &str = "bais_downloads_served_total";

    // Billing metrics
    pub const PAYMENTS_APPROVED_TOTAL: &str = "bais_payments_approved_total";
    pub const SUBSCRIPTION_CHANGES_TOTAL: &str = "bais_subscription_changes_total";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "bais_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record an accepted upload.
pub fn record_upload_accepted(analyst: &str) {
    let labels = [("analyst", analyst.to_string())];
    counter!(names::UPLOADS_ACCEPTED_TOTAL, &labels).increment(1);
}

/// Record a served download.
pub fn record_download_served() {
    counter!(names::DOWNLOADS_SERVED_TOTAL).increment(1);
}

/// Record an approved payment.
pub fn record_payment_approved(plan: &str) {
    let labels = [("plan", plan.to_string())];
    counter!(names::PAYMENTS_APPROVED_TOTAL, &labels).increment(1);
}

/// Record a subscription change (cancel/renew).
pub fn record_subscription_change(kind: &str) {
    let labels = [("kind", kind.to_string())];
    counter!(names::SUBSCRIPTION_CHANGES_TOTAL, &labels).increment(1);
}

/// Record a rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Sanitize path for metrics labels (replace IDs with placeholders).
fn sanitize_path(path: &str) -> String {
    let path = regex_lite::Regex::new(r"/uploads/[a-zA-Z0-9_-]+")
        .unwrap()
        .replace_all(path, "/uploads/:upload_id");
    let path = regex_lite::Regex::new(r"/highlights/[a-zA-Z0-9_-]+")
        .unwrap()
        .replace_all(&path, "/highlights/:highlight_id");
    let path = regex_lite::Regex::new(
        r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
    )
    .unwrap()
    .replace_all(&path, ":id");
    path.to_string()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(
            sanitize_path("/api/uploads/550e8400-e29b-41d4-a716-446655440000/download"),
            "/api/uploads/:upload_id/download"
        );
        assert_eq!(
            sanitize_path("/api/highlights/abc123/play"),
            "/api/highlights/:highlight_id/play"
        );
    }
}
