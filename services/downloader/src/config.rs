//! Runtime configuration for a download batch.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use datahub_client::{ClientError, DataHubClient, QueryParams, DEFAULT_BASE_URL};
use overlay_pipeline::PipelineTable;
use tracing::info;

use crate::error::ConfigError;

/// Everything one batch needs. Built by the CLI or the refresh task.
#[derive(Clone)]
pub struct DownloaderConfig {
    /// Root of the tile tree.
    pub root_dir: PathBuf,
    pub api_key: String,
    pub order_id: String,
    pub base_url: String,
    /// Number of concurrent workers.
    pub pool_size: usize,
    /// Dispatch at most this many files.
    pub max_jobs: Option<usize>,
    /// Parameters sent on every request; per-category ones are merged on top.
    pub base_params: QueryParams,
    pub pipelines: Arc<PipelineTable>,
}

impl DownloaderConfig {
    pub fn new(
        root_dir: impl Into<PathBuf>,
        api_key: impl Into<String>,
        order_id: impl Into<String>,
    ) -> Self {
        Self {
            root_dir: root_dir.into(),
            api_key: api_key.into(),
            order_id: order_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            pool_size: 4,
            max_jobs: None,
            base_params: QueryParams::data_spec(),
            pipelines: Arc::new(PipelineTable::default()),
        }
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn with_max_jobs(mut self, max_jobs: Option<usize>) -> Self {
        self.max_jobs = max_jobs;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_pipelines(mut self, pipelines: PipelineTable) -> Self {
        self.pipelines = Arc::new(pipelines);
        self
    }

    /// Check credentials and pool size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.order_id.trim().is_empty() {
            return Err(ConfigError::MissingOrderId);
        }
        if self.pool_size < 1 {
            return Err(ConfigError::InvalidPoolSize(self.pool_size));
        }
        Ok(())
    }

    /// HTTP client for the configured endpoint and key.
    pub fn build_client(&self) -> Result<DataHubClient, ClientError> {
        DataHubClient::with_base_url(&self.base_url, self.api_key.clone())
    }
}

impl fmt::Debug for DownloaderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloaderConfig")
            .field("root_dir", &self.root_dir)
            .field("api_key", &"<redacted>")
            .field("order_id", &self.order_id)
            .field("base_url", &self.base_url)
            .field("pool_size", &self.pool_size)
            .field("max_jobs", &self.max_jobs)
            .field("base_params", &self.base_params)
            .field("categories", &self.pipelines.len())
            .finish()
    }
}

/// The pipeline table from `path`, or the built-in one.
pub fn load_pipelines(path: Option<&Path>) -> Result<PipelineTable, ConfigError> {
    match path {
        Some(path) => Ok(PipelineTable::load(path)?),
        None => {
            let table = PipelineTable::default();
            info!(categories = table.len(), "Using built-in pipeline table");
            Ok(table)
        }
    }
}
