//! Per-upload analysis pipeline.
//!
//! Each accepted upload spawns one detached task that stages the file to
//! object storage, submits an analysis job and polls it to a terminal
//! state. Tasks are uncoordinated: no shared state beyond each task's
//! own database row, no cancellation once started, no cap on how many
//! run at once.

pub mod config;
pub mod error;
pub mod monitor;
pub mod pipeline;
pub mod retry;

pub use config::{MonitorConfig, PipelineConfig};
pub use error::{WorkerError, WorkerResult};
pub use monitor::{monitor_job, MonitorOutcome};
pub use pipeline::UploadPipeline;
