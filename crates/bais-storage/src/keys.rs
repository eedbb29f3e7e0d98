//! Key and path derivation for stored video assets.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Expiry for presigned URLs handed to the analysis service (1 hour).
pub const PRESIGN_EXPIRY: Duration = Duration::from_secs(3600);

/// Strip any path components from a user-supplied filename.
fn safe_name(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("video_{}.mp4", Utc::now().timestamp()))
}

/// Storage key for an uploaded source video.
pub fn input_key(filename: &str) -> String {
    format!("inputs/{}", safe_name(filename))
}

/// Storage key the analysis service writes its rendered result to.
pub fn output_key(now: DateTime<Utc>) -> String {
    format!("outputs/result_{}.mp4", now.timestamp())
}

/// Relative path of the processed copy under the media root,
/// partitioned by date: `videos/YYYY/MM/DD/processed_{ts}_{name}`.
pub fn processed_relative_path(now: DateTime<Utc>, original_filename: &str) -> String {
    format!(
        "videos/{}/processed_{}_{}",
        now.format("%Y/%m/%d"),
        now.timestamp(),
        safe_name(original_filename)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_input_key_strips_directories() {
        assert_eq!(input_key("game.mp4"), "inputs/game.mp4");
        assert_eq!(input_key("../../etc/passwd.mp4"), "inputs/passwd.mp4");
        assert_eq!(input_key("dir/nested/clip.mp4"), "inputs/clip.mp4");
    }

    #[test]
    fn test_output_key_is_timestamped() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(output_key(now), format!("outputs/result_{}.mp4", now.timestamp()));
    }

    #[test]
    fn test_processed_path_partitioned_by_date() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap();
        let path = processed_relative_path(now, "rally.mp4");
        assert!(path.starts_with("videos/2025/06/01/processed_"));
        assert!(path.ends_with("_rally.mp4"));
    }
}
