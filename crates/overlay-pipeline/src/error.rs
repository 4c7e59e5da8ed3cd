//! Error types for image processing and pipeline configuration.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to decode PNG from data file: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode PNG: {0}")]
    Encode(#[source] image::ImageError),

    #[error("invalid {stage} parameter: {message}")]
    InvalidParameter {
        stage: &'static str,
        message: String,
    },
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read pipeline config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse pipeline config: {0}")]
    Parse(#[from] serde_yaml::Error),
}
