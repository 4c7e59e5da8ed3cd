//! Weather overlay downloader.
//!
//! Runs one batch against the configured order and exits non-zero if any
//! file failed.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use datahub_client::DEFAULT_BASE_URL;
use downloader::{load_pipelines, DownloaderConfig, Processor};

#[derive(Parser, Debug)]
#[command(name = "downloader")]
#[command(about = "Download and transform weather overlay tiles for an order")]
struct Args {
    /// Root directory of the tile tree
    #[arg(long, env = "DATAHUB_ROOT_DIR", default_value = "data/datahub")]
    root_dir: PathBuf,

    /// Number of concurrent workers
    #[arg(long, default_value = "4")]
    pool_size: usize,

    /// Process at most this many files
    #[arg(long)]
    max_jobs: Option<usize>,

    /// Catalogue endpoint
    #[arg(long, env = "METOFFICE_DATAHUB_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Pipeline table YAML (default: built-in table)
    #[arg(long, env = "DATAHUB_PIPELINES")]
    pipelines: Option<PathBuf>,

    /// API key sent in the `apikey` header
    #[arg(long, env = "METOFFICE_DATAHUB_API_KEY", hide_env_values = true, default_value = "")]
    api_key: String,

    /// Order to mirror
    #[arg(long, env = "METOFFICE_ORDER_ID", default_value = "")]
    order_id: String,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!(root_dir = %args.root_dir.display(), "Starting weather overlay downloader");

    let pipelines = load_pipelines(args.pipelines.as_deref())?;
    let config = DownloaderConfig::new(&args.root_dir, args.api_key, args.order_id)
        .with_pool_size(args.pool_size)
        .with_max_jobs(args.max_jobs)
        .with_base_url(args.base_url)
        .with_pipelines(pipelines);
    config.validate()?;

    let client = config
        .build_client()
        .context("Failed to create catalogue client")?;
    let processor = Processor::new(config, Arc::new(client))
        .await
        .context("Failed to prepare download batch")?;

    let report = processor.run().await;
    report.log();

    if !report.is_success() {
        bail!(
            "{} of {} jobs failed",
            report.dispatched - report.succeeded(),
            report.dispatched
        );
    }

    Ok(())
}
