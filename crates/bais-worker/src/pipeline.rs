//! Upload analysis pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use bais_analysis::{AnalysisClient, JobRequest, JobStatusResponse};
use bais_db::{Database, SubtitleRepository, UploadRepository};
use bais_models::{SubtitleRecord, UploadRecord, UploadStatus};
use bais_storage::{keys, S3Client, PRESIGN_EXPIRY};

use crate::config::PipelineConfig;
use crate::error::WorkerResult;
use crate::monitor::{monitor_job, MonitorOutcome};
use crate::retry::{retry_async, RetryConfig};

const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Runs one upload through staging, submission, polling and persistence.
///
/// One detached task per upload; a task owns nothing but its own
/// database row. Every failure inside the task ends in a single
/// `Failed` status write, nothing propagates out.
pub struct UploadPipeline {
    storage: S3Client,
    analysis: AnalysisClient,
    uploads: UploadRepository,
    subtitles: SubtitleRepository,
    config: PipelineConfig,
}

impl UploadPipeline {
    pub fn new(
        storage: S3Client,
        analysis: AnalysisClient,
        db: &Database,
        config: PipelineConfig,
    ) -> Self {
        Self {
            storage,
            analysis,
            uploads: UploadRepository::new(db.pool().clone()),
            subtitles: SubtitleRepository::new(db.pool().clone()),
            config,
        }
    }

    /// Spawn the pipeline for one upload as a detached task.
    pub fn spawn(
        self: Arc<Self>,
        upload: UploadRecord,
        staged_file: PathBuf,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let upload_id = upload.upload_id.clone();
            info!(upload_id = %upload_id, "Starting analysis pipeline");

            if let Err(e) = self.execute(&upload, &staged_file).await {
                error!(upload_id = %upload_id, "Analysis pipeline failed: {}", e);
                if let Err(db_err) = self
                    .uploads
                    .update_status(&upload_id, UploadStatus::Failed)
                    .await
                {
                    error!(upload_id = %upload_id, "Failed to record failure: {}", db_err);
                }
            }
        })
    }

    /// Run the pipeline to a terminal state.
    ///
    /// Returns `Ok` once a terminal status has been written; an `Err`
    /// means no terminal write happened yet and the spawn wrapper
    /// records the failure.
    async fn execute(&self, upload: &UploadRecord, staged_file: &Path) -> WorkerResult<()> {
        self.uploads
            .update_status(&upload.upload_id, UploadStatus::Processing)
            .await?;

        self.storage
            .upload_file(staged_file, &upload.file_key, VIDEO_CONTENT_TYPE)
            .await?;

        if let Err(e) = tokio::fs::remove_file(staged_file).await {
            warn!(path = %staged_file.display(), "Could not remove staged file: {}", e);
        }

        let output_key = keys::output_key(Utc::now());
        let download_url = self
            .storage
            .presign_get(&upload.file_key, PRESIGN_EXPIRY)
            .await?;
        let upload_url = self
            .storage
            .presign_put(&output_key, VIDEO_CONTENT_TYPE, PRESIGN_EXPIRY)
            .await?;

        let request = JobRequest::new(download_url, upload_url, upload.analyst);
        let job_id = self.analysis.submit_job(&request).await?;

        match monitor_job(&self.analysis, &job_id, &self.config.monitor).await {
            MonitorOutcome::Completed(status) => {
                self.finalize_completed(upload, &status, &output_key).await
            }
            MonitorOutcome::Failed { .. } | MonitorOutcome::TimedOut => {
                self.uploads
                    .update_status(&upload.upload_id, UploadStatus::Failed)
                    .await?;
                Ok(())
            }
        }
    }

    /// Download the rendered result, persist the subtitle payload and
    /// mark the upload completed.
    async fn finalize_completed(
        &self,
        upload: &UploadRecord,
        status: &JobStatusResponse,
        output_key: &str,
    ) -> WorkerResult<()> {
        let now = Utc::now();
        let original_name = upload
            .file_key
            .rsplit('/')
            .next()
            .unwrap_or("result.mp4");
        let relative_path = keys::processed_relative_path(now, original_name);
        let local_path = self.config.media_root.join(&relative_path);

        let retry = RetryConfig::new("result_download")
            .with_max_retries(self.config.download_retries);
        retry_async(&retry, || {
            self.storage.download_file(output_key, &local_path)
        })
        .await?;

        if let Some(script) = status.script() {
            let subtitle =
                SubtitleRecord::from_script(upload.upload_id.clone(), upload.analyst, script)?;
            self.subtitles.create(&subtitle).await?;
        }

        self.uploads
            .complete(&upload.upload_id, &relative_path)
            .await?;

        info!(
            upload_id = %upload.upload_id,
            path = %relative_path,
            "Upload analysis complete"
        );
        Ok(())
    }
}
