//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Staging failed: {0}")]
    StagingFailed(String),

    #[error("Result download failed: {0}")]
    DownloadFailed(String),

    #[error("Analysis error: {0}")]
    Analysis(#[from] bais_analysis::AnalysisError),

    #[error("Storage error: {0}")]
    Storage(#[from] bais_storage::StorageError),

    #[error("Database error: {0}")]
    Db(#[from] bais_db::DbError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn staging_failed(msg: impl Into<String>) -> Self {
        Self::StagingFailed(msg.into())
    }

    pub fn download_failed(msg: impl Into<String>) -> Self {
        Self::DownloadFailed(msg.into())
    }
}
