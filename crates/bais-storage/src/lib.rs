//! Object storage client for video assets.
//!
//! This crate provides:
//! - File upload/download for source and processed videos
//! - Presigned GET/PUT URL generation for the analysis service
//! - Key derivation for input/output/processed assets

pub mod client;
pub mod error;
pub mod keys;

pub use client::{S3Client, S3Config};
pub use error::{StorageError, StorageResult};
pub use keys::{input_key, output_key, processed_relative_path, PRESIGN_EXPIRY};
