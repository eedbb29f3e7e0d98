//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Polling monitor configuration.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Interval between status polls
    pub poll_interval: Duration,
    /// Wall-clock limit before the job is declared failed
    pub max_wait: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(20 * 60),
        }
    }
}

/// Configuration for the upload pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Monitor timing
    pub monitor: MonitorConfig,
    /// Root directory processed copies are written under
    pub media_root: PathBuf,
    /// Retries for downloading the rendered result
    pub download_retries: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            monitor: MonitorConfig::default(),
            media_root: PathBuf::from("media"),
            download_retries: 3,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            monitor: MonitorConfig {
                poll_interval: Duration::from_secs(
                    std::env::var("PIPELINE_POLL_INTERVAL_SECS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(5),
                ),
                max_wait: Duration::from_secs(
                    std::env::var("PIPELINE_MAX_WAIT_SECS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(20 * 60),
                ),
            },
            media_root: PathBuf::from(
                std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string()),
            ),
            download_retries: std::env::var("PIPELINE_DOWNLOAD_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
        }
    }
}
