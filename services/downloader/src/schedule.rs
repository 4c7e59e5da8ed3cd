//! Daily refresh times.
//!
//! A batch is triggered at each configured UTC time of day. Runs publish
//! once a day, so a handful of attempts in the morning is enough to pick up
//! the new run even when it is late.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, TimeZone, Utc};
use tokio::sync::broadcast;
use tracing::info;

use crate::error::ConfigError;

pub const DEFAULT_REFRESH_TIMES: &str = "04:30,05:30,06:30";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSchedule {
    /// Sorted, without duplicates.
    times: Vec<NaiveTime>,
}

impl RefreshSchedule {
    pub fn new(mut times: Vec<NaiveTime>) -> Result<Self, ConfigError> {
        if times.is_empty() {
            return Err(ConfigError::EmptySchedule);
        }
        times.sort();
        times.dedup();
        Ok(Self { times })
    }

    /// Parse a comma-separated list of `HH:MM` times.
    pub fn parse(list: &str) -> Result<Self, ConfigError> {
        let times = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                NaiveTime::parse_from_str(s, "%H:%M")
                    .map_err(|_| ConfigError::InvalidRefreshTime(s.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(times)
    }

    pub fn times(&self) -> &[NaiveTime] {
        &self.times
    }

    /// First trigger strictly after `now`.
    pub fn next_run_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive();
        let at = |date: chrono::NaiveDate, time: NaiveTime| {
            Utc.from_utc_datetime(&date.and_time(time))
        };

        if let Some(time) = self.times.iter().find(|t| at(today, **t) > now) {
            return at(today, *time);
        }
        // Times are non-empty by construction.
        at(today + ChronoDuration::days(1), self.times[0])
    }

    /// Call `job` at every trigger until `shutdown` fires.
    ///
    /// A job that is still running when its successor is due delays that
    /// successor; triggers are never run concurrently.
    pub async fn run_forever<F, Fut>(&self, mut job: F, mut shutdown: broadcast::Receiver<()>)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        loop {
            let now = Utc::now();
            let next = self.next_run_after(now);
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            info!(next_run = %next, wait_secs = wait.as_secs(), "Waiting for next refresh");

            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Shutting down refresh schedule");
                    break;
                }
                _ = tokio::time::sleep(wait) => {
                    info!(scheduled = %next, "Running scheduled refresh");
                    job().await;
                }
            }
        }
    }
}

impl Default for RefreshSchedule {
    fn default() -> Self {
        let at = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default();
        Self {
            times: vec![at(4, 30), at(5, 30), at(6, 30)],
        }
    }
}
