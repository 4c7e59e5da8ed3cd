//! Fetch, transform and persist every file of an order.
//!
//! One dispatcher feeds a shared job queue of capacity 1. `pool_size`
//! workers pull from it, each running one job to completion before taking
//! the next, and report on an outcome channel. The caller waits for
//! exactly as many outcomes as jobs were dispatched.
//!
//! A job never leaves a partial tile behind: bytes are staged in a
//! temporary file next to the destination, synced, then renamed into place.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use datahub_client::{collect_bytes, CatalogueClient, FileEntry, QueryParams};
use metrics::{counter, histogram};
use overlay_common::{parse_file_id, resolve_filename, resolve_path};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, instrument, warn};

use crate::config::DownloaderConfig;
use crate::error::{JobError, ProcessorError};

const TEMP_PREFIX: &str = "download-";
const TEMP_SUFFIX: &str = ".tmp";

/// How a successful job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobDisposition {
    /// File id is not a forecast tile; nothing to do.
    Skipped,
    /// Tile already on disk; no download.
    CacheHit,
    /// Tile downloaded, transformed and renamed into place.
    Committed,
}

impl JobDisposition {
    fn as_label(self) -> &'static str {
        match self {
            JobDisposition::Skipped => "skipped",
            JobDisposition::CacheHit => "cache_hit",
            JobDisposition::Committed => "committed",
        }
    }
}

#[derive(Debug)]
pub struct JobOutcome {
    pub entry: FileEntry,
    pub result: Result<JobDisposition, JobError>,
}

/// Aggregate result of one batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub dispatched: usize,
    pub committed: usize,
    pub cache_hits: usize,
    pub skipped: usize,
    /// File id and error of every failed job.
    pub failures: Vec<(String, JobError)>,
    pub elapsed: Duration,
}

impl BatchReport {
    fn record(&mut self, outcome: JobOutcome) {
        match outcome.result {
            Ok(JobDisposition::Committed) => self.committed += 1,
            Ok(JobDisposition::CacheHit) => self.cache_hits += 1,
            Ok(JobDisposition::Skipped) => self.skipped += 1,
            Err(e) => self.failures.push((outcome.entry.file_id, e)),
        }
    }

    /// Outcomes received so far.
    pub fn completed(&self) -> usize {
        self.committed + self.cache_hits + self.skipped + self.failures.len()
    }

    pub fn succeeded(&self) -> usize {
        self.committed + self.cache_hits + self.skipped
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Every dispatched job reported and none failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.completed() == self.dispatched
    }

    /// Log each failure and a summary line.
    pub fn log(&self) {
        for (file_id, e) in &self.failures {
            error!(file_id = %file_id, error = %e, "Job failed");
        }
        info!(
            dispatched = self.dispatched,
            committed = self.committed,
            cache_hits = self.cache_hits,
            skipped = self.skipped,
            failed = self.failed(),
            elapsed_ms = self.elapsed.as_millis() as u64,
            "Download batch complete"
        );
    }
}

/// State shared by all workers of one batch.
struct JobContext {
    config: Arc<DownloaderConfig>,
    client: Arc<dyn CatalogueClient>,
}

/// A fetched order ready to be processed.
pub struct Processor {
    ctx: Arc<JobContext>,
    files: Vec<FileEntry>,
}

impl Processor {
    /// Validate `config` and fetch the latest manifest of its order.
    pub async fn new(
        config: DownloaderConfig,
        client: Arc<dyn CatalogueClient>,
    ) -> Result<Self, ProcessorError> {
        config.validate()?;

        let order = client
            .fetch_latest_order(&config.order_id, &config.base_params)
            .await?;
        let files = order.into_files();
        if files.is_empty() {
            return Err(ProcessorError::EmptyOrder(config.order_id));
        }

        info!(order_id = %config.order_id, files = files.len(), "Fetched order manifest");

        Ok(Self {
            ctx: Arc::new(JobContext {
                config: Arc::new(config),
                client,
            }),
            files,
        })
    }

    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    /// Run every job and wait for all of them.
    #[instrument(skip(self), fields(order_id = %self.ctx.config.order_id))]
    pub async fn run(self) -> BatchReport {
        let started = Instant::now();
        let pool_size = self.ctx.config.pool_size.max(1);

        let mut jobs = self.files;
        if let Some(max) = self.ctx.config.max_jobs {
            jobs.truncate(max);
        }
        let dispatched = jobs.len();

        info!(jobs = dispatched, pool_size, "Starting download batch");

        let (job_tx, job_rx) = mpsc::channel::<FileEntry>(1);
        let job_rx = Arc::new(Mutex::new(job_rx));
        let (outcome_tx, mut outcome_rx) = mpsc::channel::<JobOutcome>(1);

        tokio::spawn(async move {
            for entry in jobs {
                if job_tx.send(entry).await.is_err() {
                    break;
                }
            }
        });

        for worker_id in 0..pool_size {
            let job_rx = job_rx.clone();
            let outcome_tx = outcome_tx.clone();
            let ctx = self.ctx.clone();
            tokio::spawn(async move {
                loop {
                    let next = job_rx.lock().await.recv().await;
                    let Some(entry) = next else { break };

                    debug!(worker_id, file_id = %entry.file_id, "Picked up job");
                    let result = ctx.process(&entry).await;
                    if outcome_tx.send(JobOutcome { entry, result }).await.is_err() {
                        break;
                    }
                }
            });
        }
        drop(outcome_tx);

        let mut report = BatchReport {
            dispatched,
            ..Default::default()
        };
        while report.completed() < dispatched {
            match outcome_rx.recv().await {
                Some(outcome) => report.record(outcome),
                None => {
                    warn!(
                        expected = dispatched,
                        received = report.completed(),
                        "Workers stopped before every job reported"
                    );
                    break;
                }
            }
        }

        report.elapsed = started.elapsed();
        report
    }
}

impl JobContext {
    #[instrument(skip(self, entry), fields(file_id = %entry.file_id))]
    async fn process(&self, entry: &FileEntry) -> Result<JobDisposition, JobError> {
        let started = Instant::now();
        let result = self.process_inner(entry).await;

        let label = match &result {
            Ok(disposition) => disposition.as_label(),
            Err(_) => "failed",
        };
        counter!("overlay_jobs_total", "outcome" => label).increment(1);
        histogram!("overlay_job_duration_seconds").record(started.elapsed().as_secs_f64());

        result
    }

    async fn process_inner(&self, entry: &FileEntry) -> Result<JobDisposition, JobError> {
        let Some(parsed) = parse_file_id(&entry.file_id)? else {
            debug!("File id is not a forecast tile, skipping");
            return Ok(JobDisposition::Skipped);
        };

        let root = &self.config.root_dir;
        let dir = resolve_path(
            root,
            &parsed.category,
            parsed.year(),
            parsed.month(),
            parsed.day(),
        )
        .await
        .map_err(|source| JobError::Io {
            path: root.join(&parsed.category),
            source,
        })?;
        let filename = resolve_filename(&dir, parsed.hour_offset);

        let exists = tokio::fs::try_exists(&filename)
            .await
            .map_err(|source| JobError::Io {
                path: filename.clone(),
                source,
            })?;
        if exists {
            debug!(path = %filename.display(), "Tile already on disk");
            return Ok(JobDisposition::CacheHit);
        }

        let pipeline = self
            .config
            .pipelines
            .get(&parsed.category)
            .cloned()
            .ok_or_else(|| JobError::UnsupportedCategory(parsed.category.clone()))?;

        let mut params = self.config.base_params.clone();
        params.merge(&pipeline.query.iter().collect::<QueryParams>());

        let stream = self
            .client
            .fetch_file(&self.config.order_id, &entry.file_id, &params)
            .await?;
        let data = collect_bytes(stream).await?;
        let downloaded = data.len();

        let png = tokio::task::spawn_blocking(move || pipeline.process_png(&data))
            .await
            .map_err(|e| JobError::Task(e.to_string()))??;

        let target = filename.clone();
        tokio::task::spawn_blocking(move || commit(&dir, &target, &png))
            .await
            .map_err(|e| JobError::Task(e.to_string()))??;

        info!(
            category = %parsed.category,
            hour = parsed.hour_offset,
            bytes = downloaded,
            path = %filename.display(),
            "Tile committed"
        );
        Ok(JobDisposition::Committed)
    }
}

/// Stage `data` in `dir`, sync it, then rename it onto `target`.
///
/// The staging file is deleted on every failure path. Two jobs racing for
/// the same target both succeed; the last rename wins.
fn commit(dir: &Path, target: &Path, data: &[u8]) -> Result<(), JobError> {
    let io_err = |path: &Path, source: std::io::Error| JobError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut staged = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)
        .map_err(|e| io_err(dir, e))?;

    let written = staged
        .write_all(data)
        .and_then(|_| staged.flush())
        .and_then(|_| staged.as_file().sync_all());
    if let Err(e) = written {
        return Err(io_err(staged.path(), e));
    }

    staged.persist(target).map_err(|e| io_err(target, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_writes_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("07.png");

        commit(dir.path(), &target, b"tile").unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"tile");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_commit_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("07.png");
        std::fs::write(&target, b"old").unwrap();

        commit(dir.path(), &target, b"new").unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"new");
    }

    #[test]
    fn test_commit_failure_removes_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the target path makes the rename fail.
        let target = dir.path().join("07.png");
        std::fs::create_dir(&target).unwrap();

        let err = commit(dir.path(), &target, b"tile").unwrap_err();
        assert!(matches!(err, JobError::Io { .. }));

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["07.png".to_string()]);
    }

    #[test]
    fn test_commit_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = commit(&missing, &missing.join("00.png"), b"x").unwrap_err();
        assert!(matches!(err, JobError::Io { path, .. } if path == missing));
    }

    #[test]
    fn test_report_success_requires_all_outcomes() {
        let mut report = BatchReport {
            dispatched: 2,
            ..Default::default()
        };
        report.committed = 1;
        assert!(!report.is_success());
        report.cache_hits = 1;
        assert!(report.is_success());
        report.failures.push(("x".into(), JobError::Task("boom".into())));
        assert!(!report.is_success());
        assert_eq!(report.completed(), 3);
    }
}
