//! Generators for on-disk product artifacts.
//!
//! Files are named `<key>_<YYYYMMDD_hhmmss>.<ext>` and contain a few
//! placeholder bytes; the selector only looks at names.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use tempfile::TempDir;

/// File name for an artifact of `key` taken at `timestamp`.
pub fn artifact_name(key: &str, timestamp: DateTime<Utc>, ext: &str) -> String {
    format!("{}_{}.{}", key, timestamp.format("%Y%m%d_%H%M%S"), ext)
}

/// Write one placeholder PNG artifact into `dir` and return its path.
pub fn write_artifact(dir: &Path, key: &str, timestamp: DateTime<Utc>) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(artifact_name(key, timestamp, "png"));
    fs::write(&path, b"\x89PNG\r\n\x1a\n")?;
    Ok(path)
}

/// Write `count` artifacts spaced `step` apart, the newest at `newest`.
///
/// Returned paths are oldest first.
pub fn write_artifact_series(
    dir: &Path,
    key: &str,
    newest: DateTime<Utc>,
    step: Duration,
    count: usize,
) -> io::Result<Vec<PathBuf>> {
    (0..count)
        .rev()
        .map(|i| write_artifact(dir, key, newest - step * i as i32))
        .collect()
}

/// A temporary data root with one series already written under
/// `<root>/<subdir>`.
pub fn artifact_tree(
    subdir: &str,
    key: &str,
    newest: DateTime<Utc>,
    step: Duration,
    count: usize,
) -> io::Result<(TempDir, Vec<PathBuf>)> {
    let root = tempfile::tempdir()?;
    let paths = write_artifact_series(&root.path().join(subdir), key, newest, step, count)?;
    Ok((root, paths))
}
