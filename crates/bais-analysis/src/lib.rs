//! Client for the remote GPU analysis service.
//!
//! The service ingests a source video through a presigned GET URL,
//! renders the commentated result through a presigned PUT URL, and
//! exposes job status (with an embedded script payload on success)
//! for polling.

pub mod client;
pub mod error;
pub mod types;

pub use client::{AnalysisClient, AnalysisConfig};
pub use error::{AnalysisError, AnalysisResult};
pub use types::{JobRequest, JobStatusResponse, SubmitResponse};
