//! Subtitle records derived from completed analyses.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Analyst, UploadId};

/// Commentary script attached 1:1 to a completed upload.
///
/// The payload is the raw JSON script (cue text + timings) exactly as
/// returned by the analysis service.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SubtitleRecord {
    pub subtitle_id: String,
    pub upload_id: UploadId,
    pub analyst: Analyst,
    /// UTF-8 JSON bytes of the script payload
    pub payload: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

impl SubtitleRecord {
    /// Create a subtitle record from a script payload.
    pub fn new(upload_id: UploadId, analyst: Analyst, payload: Vec<u8>) -> Self {
        Self {
            subtitle_id: Uuid::new_v4().to_string(),
            upload_id,
            analyst,
            payload,
            created_at: Utc::now(),
        }
    }

    /// Create from an arbitrary JSON script value.
    pub fn from_script(
        upload_id: UploadId,
        analyst: Analyst,
        script: &serde_json::Value,
    ) -> serde_json::Result<Self> {
        let payload = serde_json::to_vec(script)?;
        Ok(Self::new(upload_id, analyst, payload))
    }

    /// Decode the payload back into a JSON value.
    pub fn script(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(&self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_script_round_trip() {
        let script = json!([
            {"start": 1.2, "end": 3.4, "text": "Leadoff double into the gap!"}
        ]);
        let record =
            SubtitleRecord::from_script(UploadId::new(), Analyst::KimSeonO, &script).unwrap();
        assert_eq!(record.script().unwrap(), script);
    }
}
