//! Weather overlay downloader.
//!
//! Mirrors the latest run of a catalogue order onto local disk:
//! - fetches the order manifest
//! - downloads each forecast tile not already present
//! - applies the category's image pipeline
//! - commits each tile atomically under `{root}/{category}/{YYYY}/{MM}/{DD}/{HH}.png`

pub mod config;
pub mod error;
pub mod processor;
pub mod schedule;

pub use config::{load_pipelines, DownloaderConfig};
pub use error::{ConfigError, JobError, ProcessorError};
pub use processor::{BatchReport, JobDisposition, JobOutcome, Processor};
pub use schedule::{RefreshSchedule, DEFAULT_REFRESH_TIMES};
