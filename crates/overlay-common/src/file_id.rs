//! Provider file identifier parsing.
//!
//! Identifiers look like `cloud_amount_total_ts07_2024011800`: the data
//! category, the forecast hour offset after `_ts`, and the run date
//! followed by the `00` run hour.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::FileIdError;
use crate::layout::is_single_segment;

static FILE_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(.*?)_ts([^_]{1,2})_(\d{4})(\d{2})(\d{2})00").expect("valid file id pattern")
});

/// The parts of a file identifier that determine where a tile lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedFileId {
    pub category: String,
    pub hour_offset: u32,
    pub run_date: NaiveDate,
}

impl ParsedFileId {
    pub fn year(&self) -> i32 {
        self.run_date.year()
    }

    pub fn month(&self) -> u32 {
        self.run_date.month()
    }

    pub fn day(&self) -> u32 {
        self.run_date.day()
    }
}

/// Parse a provider file identifier.
///
/// Returns `Ok(None)` when the identifier does not have the expected shape;
/// callers treat those entries as out of scope. An identifier with the right
/// shape but a non-numeric hour, an impossible date or a category that is
/// not a single path segment is an error.
pub fn parse_file_id(file_id: &str) -> Result<Option<ParsedFileId>, FileIdError> {
    let Some(caps) = FILE_ID_PATTERN.captures(file_id) else {
        return Ok(None);
    };

    let category = &caps[1];
    if !is_single_segment(category) {
        return Err(FileIdError::InvalidCategory {
            file_id: file_id.to_string(),
            category: category.to_string(),
        });
    }

    let hour_text = &caps[2];
    let invalid_hour = || FileIdError::InvalidHour {
        file_id: file_id.to_string(),
        value: hour_text.to_string(),
    };
    // `u32::from_str` accepts a leading `+`.
    if !hour_text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid_hour());
    }
    let hour_offset: u32 = hour_text.parse().map_err(|_| invalid_hour())?;

    let (year, month, day) = (&caps[3], &caps[4], &caps[5]);
    let run_date = match (year.parse::<i32>(), month.parse::<u32>(), day.parse::<u32>()) {
        (Ok(y), Ok(m), Ok(d)) => NaiveDate::from_ymd_opt(y, m, d),
        _ => None,
    }
    .ok_or_else(|| FileIdError::InvalidDate {
        file_id: file_id.to_string(),
        year: year.to_string(),
        month: month.to_string(),
        day: day.to_string(),
    })?;

    Ok(Some(ParsedFileId {
        category: category.to_string(),
        hour_offset,
        run_date,
    }))
}
