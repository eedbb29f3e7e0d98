//! Analysis service HTTP client.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::error::{AnalysisError, AnalysisResult};
use crate::types::{HealthResponse, JobRequest, JobStatusResponse, SubmitResponse};

/// Configuration for the analysis client.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Base URL of the analysis service
    pub base_url: String,
    /// Timeout for job submission requests
    pub submit_timeout: Duration,
    /// Timeout for status polls
    pub status_timeout: Duration,
    /// Max retries for transient failures
    pub max_retries: u32,
    /// Base delay for exponential backoff (doubles each attempt)
    pub backoff_base: Duration,
    /// Cap on the backoff delay
    pub backoff_max: Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            submit_timeout: Duration::from_secs(30),
            status_timeout: Duration::from_secs(15),
            max_retries: 10,
            backoff_base: Duration::from_secs(2),
            backoff_max: Duration::from_secs(60),
        }
    }
}

impl AnalysisConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("ANALYSIS_API_URL")
                .unwrap_or_else(|_| "http://localhost:8001".to_string()),
            submit_timeout: Duration::from_secs(
                std::env::var("ANALYSIS_SUBMIT_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            status_timeout: Duration::from_secs(
                std::env::var("ANALYSIS_STATUS_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(15),
            ),
            max_retries: std::env::var("ANALYSIS_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            backoff_base: Duration::from_secs(2),
            backoff_max: Duration::from_secs(60),
        }
    }

    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.backoff_base.saturating_mul(2u32.saturating_pow(attempt));
        delay.min(self.backoff_max)
    }
}

/// Client for the remote GPU analysis service.
pub struct AnalysisClient {
    http: Client,
    config: AnalysisConfig,
}

impl AnalysisClient {
    /// Create a new analysis client.
    pub fn new(config: AnalysisConfig) -> AnalysisResult<Self> {
        let http = Client::builder().build().map_err(AnalysisError::Network)?;
        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> AnalysisResult<Self> {
        Self::new(AnalysisConfig::from_env())
    }

    /// Check if the analysis service is reachable.
    pub async fn health_check(&self) -> AnalysisResult<bool> {
        let url = format!("{}/health", self.config.base_url);

        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                let health: HealthResponse = response.json().await?;
                Ok(health.status == "healthy" || health.status == "ok")
            }
            Ok(response) => {
                warn!("Analysis service health check failed: {}", response.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Analysis service health check error: {}", e);
                Ok(false)
            }
        }
    }

    /// Submit a processing job, returning the remote job id.
    pub async fn submit_job(&self, request: &JobRequest) -> AnalysisResult<String> {
        let url = format!("{}/process_video", self.config.base_url);

        debug!(
            analyst_select = request.analyst_select,
            "Submitting analysis job to {}", url
        );

        let response = self
            .with_retry(|| async {
                let response = self
                    .http
                    .post(&url)
                    .json(request)
                    .timeout(self.config.submit_timeout)
                    .send()
                    .await
                    .map_err(AnalysisError::Network)?;
                Self::check_status(response).await
            })
            .await?;

        let submit: SubmitResponse = response.json().await?;
        info!(job_id = %submit.job_id, "Analysis job submitted");
        Ok(submit.job_id)
    }

    /// Fetch the status of a submitted job.
    pub async fn job_status(&self, job_id: &str) -> AnalysisResult<JobStatusResponse> {
        let url = format!("{}/status/{}", self.config.base_url, job_id);

        let response = self
            .with_retry(|| async {
                let response = self
                    .http
                    .get(&url)
                    .timeout(self.config.status_timeout)
                    .send()
                    .await
                    .map_err(AnalysisError::Network)?;
                Self::check_status(response).await
            })
            .await?;

        let status: JobStatusResponse = response.json().await?;
        Ok(status)
    }

    /// Convert non-success responses into status errors.
    async fn check_status(response: reqwest::Response) -> AnalysisResult<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            Err(AnalysisError::Status { status, body })
        }
    }

    /// Execute with retry on transient failures.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> AnalysisResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = AnalysisResult<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.config.delay_for_attempt(attempt);
                    warn!(
                        "Analysis request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| AnalysisError::InvalidResponse("retry loop exhausted".to_string())))
    }
}
