//! Scheduled download batches run inside the server process.

use std::sync::Arc;

use downloader::{DownloaderConfig, Processor, RefreshSchedule};
use metrics::counter;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Workers used by scheduled batches.
pub const REFRESH_POOL_SIZE: usize = 1;

/// Run one batch. Failures are logged and never propagate.
pub async fn run_refresh(config: DownloaderConfig) {
    let client = match config.build_client() {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to create catalogue client");
            counter!("overlay_refresh_total", "status" => "error").increment(1);
            return;
        }
    };

    let processor = match Processor::new(config, Arc::new(client)).await {
        Ok(processor) => processor,
        Err(e) => {
            error!(error = %e, "Refresh could not start");
            counter!("overlay_refresh_total", "status" => "error").increment(1);
            return;
        }
    };

    let report = processor.run().await;
    report.log();
    if report.is_success() {
        counter!("overlay_refresh_total", "status" => "success").increment(1);
    } else {
        warn!(failed = report.failed(), "Refresh finished with failures");
        counter!("overlay_refresh_total", "status" => "partial").increment(1);
    }
}

/// Spawn the refresh loop. It stops when `shutdown` fires.
pub fn spawn_refresh(
    schedule: RefreshSchedule,
    config: DownloaderConfig,
    shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    let config = config.with_pool_size(REFRESH_POOL_SIZE);
    info!(
        times = ?schedule.times(),
        root_dir = %config.root_dir.display(),
        "Scheduling overlay refresh"
    );

    tokio::spawn(async move {
        schedule
            .run_forever(move || run_refresh(config.clone()), shutdown)
            .await;
    })
}
