//! Overlay tile server.
//!
//! Serves processed overlay tiles with previous-run fallback and refreshes
//! them from the catalogue at fixed times of day.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::broadcast;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use downloader::{load_pipelines, DownloaderConfig, RefreshSchedule, DEFAULT_REFRESH_TIMES};
use overlay_api::{build_router, refresh, AppState, STATIC_PREFIX};

#[derive(Parser, Debug)]
#[command(name = "overlay-api")]
#[command(about = "Weather overlay tile server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    listen: String,

    /// Root directory of the tile tree
    #[arg(long, env = "DATAHUB_ROOT_DIR", default_value = "data/datahub")]
    root_dir: PathBuf,

    /// Comma-separated UTC refresh times (HH:MM)
    #[arg(long, default_value = DEFAULT_REFRESH_TIMES)]
    refresh_times: String,

    /// Serve only; never download
    #[arg(long)]
    no_refresh: bool,

    /// Catalogue endpoint
    #[arg(long, env = "METOFFICE_DATAHUB_BASE_URL", default_value = datahub_client::DEFAULT_BASE_URL)]
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
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
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

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    info!("Prometheus metrics exporter initialized");

    tokio::fs::create_dir_all(&args.root_dir)
        .await
        .with_context(|| format!("Failed to create {}", args.root_dir.display()))?;

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let refresh_task = if args.no_refresh {
        info!("Scheduled refresh disabled");
        None
    } else {
        let schedule = RefreshSchedule::parse(&args.refresh_times)?;
        let config = DownloaderConfig::new(&args.root_dir, args.api_key, args.order_id)
            .with_base_url(args.base_url)
            .with_pipelines(load_pipelines(args.pipelines.as_deref())?);
        config
            .validate()
            .context("Scheduled refresh needs credentials; pass --no-refresh to serve only")?;
        Some(refresh::spawn_refresh(
            schedule,
            config,
            shutdown_tx.subscribe(),
        ))
    };

    let state = AppState::new(&args.root_dir).with_prometheus(prometheus_handle);
    let app = build_router(state);

    let addr: SocketAddr = args.listen.parse()?;
    info!(address = %addr, prefix = STATIC_PREFIX, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let shutdown_signal = shutdown_tx.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
            info!("Received shutdown signal");
            shutdown_signal.send(()).ok();
        })
        .await?;

    if let Some(task) = refresh_task {
        task.await.ok();
    }

    Ok(())
}
