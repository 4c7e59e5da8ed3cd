//! Error types for identifier parsing and fallback resolution.

use thiserror::Error;

/// Failure to interpret a provider file identifier that matched the
/// expected shape. A non-matching identifier is not an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FileIdError {
    #[error("failed to convert {value} to integer in file id {file_id}")]
    InvalidHour { file_id: String, value: String },

    #[error("category {category:?} in file id {file_id} is not a single path segment")]
    InvalidCategory { file_id: String, category: String },

    #[error("invalid run date {year}-{month}-{day} in file id {file_id}")]
    InvalidDate {
        file_id: String,
        year: String,
        month: String,
        day: String,
    },
}

/// Reasons a missing tile cannot be redirected to the previous day's run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FallbackError {
    #[error("URL path does not match expected format: {0}")]
    PathMismatch(String),

    #[error("invalid date format in URL: {0}")]
    InvalidDate(String),

    #[error("invalid hour format in URL: {0}")]
    InvalidHour(String),

    #[error("calculated hour {0} is out of range (0-72)")]
    HourOutOfRange(u32),
}

impl FallbackError {
    /// HTTP status the serving layer answers with. Every fallback failure
    /// is surfaced as a plain miss.
    pub fn http_status_code(&self) -> u16 {
        404
    }
}
