//! On-disk layout of processed overlay tiles.
//!
//! Tiles live at `{root}/{category}/{YYYY}/{MM}/{DD}/{HH}.png`. The layout
//! is the contract between the downloader and the static file server.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Extension of every persisted tile.
pub const OVERLAY_EXTENSION: &str = "png";

/// True when `name` joins onto a directory as exactly one child.
pub fn is_single_segment(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Directory for one category and run date, created if absent.
///
/// Creating a directory that already exists (including one created
/// concurrently by another worker) is not an error. A category that would
/// leave `root` is rejected with `InvalidInput`.
pub async fn resolve_path(
    root: &Path,
    category: &str,
    year: i32,
    month: u32,
    day: u32,
) -> io::Result<PathBuf> {
    if !is_single_segment(category) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("category {:?} is not a single path segment", category),
        ));
    }

    let path = root
        .join(category)
        .join(format!("{:04}", year))
        .join(format!("{:02}", month))
        .join(format!("{:02}", day));
    tokio::fs::create_dir_all(&path).await?;
    Ok(path)
}

/// Final tile path for a forecast hour inside a resolved directory.
pub fn resolve_filename(dir: &Path, hour: u32) -> PathBuf {
    dir.join(format!("{:02}.{}", hour, OVERLAY_EXTENSION))
}
