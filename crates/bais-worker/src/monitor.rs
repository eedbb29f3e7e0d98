//! Job polling monitor.

use tokio::time::Instant;
use tracing::{error, info, warn};

use bais_analysis::{AnalysisClient, JobStatusResponse};
use bais_models::UploadStatus;

use crate::config::MonitorConfig;

/// Terminal outcome of a monitored job.
#[derive(Debug)]
pub enum MonitorOutcome {
    /// Job finished; the final status response carries the output payload
    Completed(JobStatusResponse),
    /// Job reported failure
    Failed { error: Option<String> },
    /// Wall-clock limit exhausted before a terminal state
    TimedOut,
}

/// Poll a job until it reaches a terminal state or the deadline passes.
///
/// Poll errors are logged and swallowed; the loop keeps going until the
/// deadline. The interval between polls is fixed (blocking sleep, not
/// event-driven).
pub async fn monitor_job(
    client: &AnalysisClient,
    job_id: &str,
    config: &MonitorConfig,
) -> MonitorOutcome {
    let started = Instant::now();

    loop {
        if started.elapsed() > config.max_wait {
            error!(job_id = %job_id, waited = ?config.max_wait, "Analysis job timed out");
            return MonitorOutcome::TimedOut;
        }

        match client.job_status(job_id).await {
            Ok(status) => {
                if let Some(step) = &status.step {
                    info!(
                        job_id = %job_id,
                        status = %status.status,
                        progress = status.progress.unwrap_or(0),
                        step = %step,
                        "Analysis job progress"
                    );
                }

                match UploadStatus::from_remote(&status.status) {
                    Some(UploadStatus::Completed) => {
                        info!(job_id = %job_id, "Analysis job completed");
                        return MonitorOutcome::Completed(status);
                    }
                    Some(UploadStatus::Failed) => {
                        error!(
                            job_id = %job_id,
                            error = status.error.as_deref().unwrap_or("unknown"),
                            "Analysis job failed"
                        );
                        return MonitorOutcome::Failed {
                            error: status.error,
                        };
                    }
                    _ => {}
                }
            }
            Err(e) => {
                warn!(job_id = %job_id, "Status poll error: {}", e);
            }
        }

        tokio::time::sleep(config.poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bais_analysis::AnalysisConfig;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_config() -> MonitorConfig {
        MonitorConfig {
            poll_interval: Duration::from_millis(10),
            max_wait: Duration::from_secs(5),
        }
    }

    fn client_without_retries(base_url: String) -> AnalysisClient {
        AnalysisClient::new(AnalysisConfig {
            base_url,
            max_retries: 0,
            backoff_base: Duration::from_millis(1),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_monitor_reaches_completed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/status/job-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "IN_PROGRESS", "progress": 40, "step": "analysis"
            })))
            .up_to_n_times(2)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/status/job-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "SUCCESS",
                "output": {"script": [{"text": "Strike three!"}]}
            })))
            .mount(&server)
            .await;

        let client = client_without_retries(server.uri());
        let outcome = monitor_job(&client, "job-1", &fast_config()).await;

        match outcome {
            MonitorOutcome::Completed(status) => assert!(status.script().is_some()),
            other => panic!("expected Completed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_monitor_reports_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/status/job-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "FAILED", "error": "cuda out of memory"
            })))
            .mount(&server)
            .await;

        let client = client_without_retries(server.uri());
        let outcome = monitor_job(&client, "job-2", &fast_config()).await;

        match outcome {
            MonitorOutcome::Failed { error } => {
                assert_eq!(error.as_deref(), Some("cuda out of memory"))
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_monitor_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/status/job-3"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "IN_PROGRESS"})),
            )
            .mount(&server)
            .await;

        let client = client_without_retries(server.uri());
        let config = MonitorConfig {
            poll_interval: Duration::from_millis(10),
            max_wait: Duration::from_millis(50),
        };

        let outcome = monitor_job(&client, "job-3", &config).await;
        assert!(matches!(outcome, MonitorOutcome::TimedOut));
    }

    #[tokio::test]
    async fn test_monitor_swallows_poll_errors() {
        let server = MockServer::start().await;

        // Two server errors, then success; the loop must survive them
        Mock::given(method("GET"))
            .and(path("/status/job-4"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/status/job-4"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "COMPLETED"})),
            )
            .mount(&server)
            .await;

        let client = client_without_retries(server.uri());
        let outcome = monitor_job(&client, "job-4", &fast_config()).await;
        assert!(matches!(outcome, MonitorOutcome::Completed(_)));
    }
}
