//! Previous-run fallback for forecast tiles that are not on disk.
//!
//! Runs are published once a day and each covers forecast hours 0 to 72.
//! Hour `H` of the run on day `D` describes the same instant as hour
//! `H + 24` of the run on day `D - 1`, so a missing tile can be served from
//! the previous day's run as long as `H + 24` is still inside that run.

use chrono::{Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::FallbackError;
use crate::layout::OVERLAY_EXTENSION;

/// Last forecast hour a run publishes.
pub const MAX_FORECAST_HOUR: u32 = 72;

static FORECAST_PATH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^/]+)/(\d{4}/\d{2}/\d{2})/(\d{2})\.png$").expect("valid forecast path pattern")
});

/// Tile the serving layer should redirect to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackTarget {
    pub category: String,
    pub date: NaiveDate,
    pub hour: u32,
}

impl FallbackTarget {
    /// Path relative to the tile root, e.g. `precipitation/2023/10/14/44.png`.
    pub fn to_path(&self) -> String {
        format!(
            "{}/{}/{:02}.{}",
            self.category,
            self.date.format("%Y/%m/%d"),
            self.hour,
            OVERLAY_EXTENSION
        )
    }
}

/// Compute the single fallback hop for a missing tile.
///
/// `path` is relative to the static prefix, in the form
/// `<category>/<YYYY>/<MM>/<DD>/<HH>.png`. The result is never resolved
/// further; if the target is also missing the static layer sees a new miss.
pub fn resolve_fallback(path: &str) -> Result<FallbackTarget, FallbackError> {
    let caps = FORECAST_PATH_PATTERN
        .captures(path)
        .ok_or_else(|| FallbackError::PathMismatch(path.to_string()))?;

    let date = NaiveDate::parse_from_str(&caps[2], "%Y/%m/%d")
        .map_err(|e| FallbackError::InvalidDate(format!("{}: {}", &caps[2], e)))?;
    let hour: u32 = caps[3]
        .parse()
        .map_err(|_| FallbackError::InvalidHour(caps[3].to_string()))?;

    let previous_date = date
        .checked_sub_signed(Duration::days(1))
        .ok_or_else(|| FallbackError::InvalidDate(caps[2].to_string()))?;
    let fallback_hour = hour + 24;

    if fallback_hour > MAX_FORECAST_HOUR {
        return Err(FallbackError::HourOutOfRange(fallback_hour));
    }

    Ok(FallbackTarget {
        category: caps[1].to_string(),
        date: previous_date,
        hour: fallback_hour,
    })
}
