//! Error types for the downloader.

use std::path::PathBuf;

use datahub_client::ClientError;
use overlay_common::FileIdError;
use overlay_pipeline::{PipelineError, TableError};
use thiserror::Error;

/// Invalid or missing configuration. Fatal, never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing API key (set METOFFICE_DATAHUB_API_KEY)")]
    MissingApiKey,

    #[error("missing order id (set METOFFICE_ORDER_ID)")]
    MissingOrderId,

    #[error("pool size must be at least 1, got {0}")]
    InvalidPoolSize(usize),

    #[error("invalid refresh time {0:?}, expected HH:MM")]
    InvalidRefreshTime(String),

    #[error("refresh schedule has no times")]
    EmptySchedule,

    #[error(transparent)]
    Pipelines(#[from] TableError),
}

/// Failure of a single file job. Other jobs are unaffected.
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    FileId(#[from] FileIdError),

    #[error("unsupported data category: {0}")]
    UnsupportedCategory(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("job task failed: {0}")]
    Task(String),
}

/// Failure before any job was dispatched.
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("no files to download for order {0}")]
    EmptyOrder(String),
}
