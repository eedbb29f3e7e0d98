//! Analysis client error types.

use thiserror::Error;

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// HTTP statuses retried with backoff.
const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Analysis service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalysisError {
    /// Whether the operation should be retried with backoff.
    ///
    /// Transient HTTP statuses (429/500/502/503/504) and connect/timeout
    /// failures are retryable; everything else surfaces immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            AnalysisError::Status { status, .. } => RETRYABLE_STATUSES.contains(status),
            AnalysisError::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        for status in [429, 500, 502, 503, 504] {
            let err = AnalysisError::Status {
                status,
                body: String::new(),
            };
            assert!(err.is_retryable(), "{} should be retryable", status);
        }

        for status in [400, 401, 403, 404, 422] {
            let err = AnalysisError::Status {
                status,
                body: String::new(),
            };
            assert!(!err.is_retryable(), "{} should not be retryable", status);
        }
    }
}
