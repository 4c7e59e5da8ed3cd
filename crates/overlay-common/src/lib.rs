//! Common types shared by the overlay downloader and the tile server.
//!
//! - File identifier parsing (`<category>_ts<hour>_<YYYYMMDD>00`)
//! - On-disk layout (`{root}/{category}/{YYYY}/{MM}/{DD}/{HH}.png`)
//! - Previous-run fallback for missing forecast tiles

pub mod error;
pub mod fallback;
pub mod file_id;
pub mod layout;

pub use error::{FallbackError, FileIdError};
pub use fallback::{resolve_fallback, FallbackTarget, MAX_FORECAST_HOUR};
pub use file_id::{parse_file_id, ParsedFileId};
pub use layout::{resolve_filename, resolve_path, OVERLAY_EXTENSION};
