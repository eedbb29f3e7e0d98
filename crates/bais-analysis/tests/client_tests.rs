//! Analysis client integration tests against a mock service.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bais_analysis::{AnalysisClient, AnalysisConfig, JobRequest};
use bais_models::Analyst;

fn test_client(base_url: String) -> AnalysisClient {
    AnalysisClient::new(AnalysisConfig {
        base_url,
        submit_timeout: Duration::from_secs(5),
        status_timeout: Duration::from_secs(5),
        max_retries: 3,
        backoff_base: Duration::from_millis(10),
        backoff_max: Duration::from_millis(50),
    })
    .unwrap()
}

#[tokio::test]
async fn submit_job_returns_job_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/process_video"))
        .and(body_json(json!({
            "s3_video_url": "https://bucket/inputs/a.mp4?sig",
            "s3_upload_url": "https://bucket/outputs/result_1.mp4?sig",
            "analyst_select": 2
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"job_id": "job-42"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(server.uri());
    let request = JobRequest::new(
        "https://bucket/inputs/a.mp4?sig",
        "https://bucket/outputs/result_1.mp4?sig",
        Analyst::LeeSunChil,
    );

    let job_id = client.submit_job(&request).await.unwrap();
    assert_eq!(job_id, "job-42");
}

#[tokio::test]
async fn submit_retries_transient_errors() {
    let server = MockServer::start().await;

    // Two 503s, then success
    Mock::given(method("POST"))
        .and(path("/process_video"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/process_video"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"job_id": "job-7"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(server.uri());
    let request = JobRequest::new("in", "out", Analyst::default());

    let job_id = client.submit_job(&request).await.unwrap();
    assert_eq!(job_id, "job-7");
}

#[tokio::test]
async fn submit_does_not_retry_client_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/process_video"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(server.uri());
    let request = JobRequest::new("in", "out", Analyst::default());

    let err = client.submit_job(&request).await.unwrap_err();
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn job_status_parses_progress_and_output() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/status/job-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "COMPLETED",
            "progress": 100,
            "step": "render",
            "output": {"script": [{"start": 0.5, "text": "Play ball!"}]}
        })))
        .mount(&server)
        .await;

    let client = test_client(server.uri());
    let status = client.job_status("job-42").await.unwrap();

    assert_eq!(status.status, "COMPLETED");
    assert_eq!(status.progress, Some(100));
    assert_eq!(status.step.as_deref(), Some("render"));
    assert!(status.script().is_some());
}

#[tokio::test]
async fn health_check_tolerates_unreachable_service() {
    let client = test_client("http://127.0.0.1:1".to_string());
    assert!(!client.health_check().await.unwrap());
}
