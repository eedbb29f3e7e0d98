//! Analysis service request/response types.

use serde::{Deserialize, Serialize};

use bais_models::Analyst;

/// Job submission request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    /// Presigned GET URL for the source video
    pub s3_video_url: String,
    /// Presigned PUT URL the service renders the result to
    pub s3_upload_url: String,
    /// Analyst persona selector
    pub analyst_select: u8,
}

impl JobRequest {
    pub fn new(
        s3_video_url: impl Into<String>,
        s3_upload_url: impl Into<String>,
        analyst: Analyst,
    ) -> Self {
        Self {
            s3_video_url: s3_video_url.into(),
            s3_upload_url: s3_upload_url.into(),
            analyst_select: analyst.remote_select(),
        }
    }
}

/// Response to a job submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub job_id: String,
}

/// Job status as reported by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusResponse {
    /// Raw status string (reconciled via `UploadStatus::from_remote`)
    #[serde(default)]
    pub status: String,
    /// Progress percentage (0-100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    /// Current processing step description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
    /// Output payload, present on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    /// Error message, present on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobStatusResponse {
    /// Extract the commentary script from the output payload, if any.
    ///
    /// The output is only trusted when it is an object carrying a
    /// `script` key; anything else is ignored.
    pub fn script(&self) -> Option<&serde_json::Value> {
        self.output
            .as_ref()
            .and_then(|o| o.as_object())
            .and_then(|o| o.get("script"))
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_script_extraction() {
        let status: JobStatusResponse = serde_json::from_value(json!({
            "status": "COMPLETED",
            "output": {"script": [{"text": "And it's gone!"}]}
        }))
        .unwrap();
        assert!(status.script().is_some());

        // Output that is not an object carries no script
        let status: JobStatusResponse = serde_json::from_value(json!({
            "status": "COMPLETED",
            "output": "https://example.com/result.mp4"
        }))
        .unwrap();
        assert!(status.script().is_none());

        let status: JobStatusResponse =
            serde_json::from_value(json!({"status": "IN_PROGRESS"})).unwrap();
        assert!(status.script().is_none());
    }
}
