use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, instrument};
use viewer_common::{EndTime, ViewerError, ViewerResult};
use walkdir::WalkDir;

/// Image extensions considered artifacts unless configured otherwise.
pub const DEFAULT_EXTENSIONS: &[&str] = &["png", "gif", "jpg", "jpeg"];

const TIMESTAMP_FORMATS: &[&str] = &["%Y%m%d_%H%M%S", "%Y%m%d%H%M%S"];

/// One rendered, time-stamped product frame on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub timestamp: DateTime<Utc>,
}

/// Picks artifacts for a key inside a lookback window.
#[derive(Debug, Clone)]
pub struct ProductSelector {
    extensions: Vec<String>,
    max_frames: Option<usize>,
}

impl Default for ProductSelector {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect())
    }
}

impl ProductSelector {
    pub fn new(extensions: Vec<String>) -> Self {
        Self {
            extensions: extensions.into_iter().map(|e| e.to_ascii_lowercase()).collect(),
            max_frames: None,
        }
    }

    /// Keep only the newest `max` frames of any selection.
    pub fn with_max_frames(mut self, max: usize) -> Self {
        self.max_frames = Some(max);
        self
    }

    /// All artifacts for `key` in `dir` whose timestamp falls inside
    /// `[reference - lookback, reference]`, oldest first.
    ///
    /// A missing directory is an empty selection, not an error.
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub fn select(
        &self,
        key: &str,
        dir: &Path,
        lookback_secs: u32,
        end_time: &EndTime,
        now: DateTime<Utc>,
    ) -> ViewerResult<Vec<Artifact>> {
        if !dir.is_dir() {
            debug!("Search directory does not exist");
            return Ok(Vec::new());
        }

        let window = end_time.window(lookback_secs, now);
        let mut artifacts = Vec::new();

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| ViewerError::Io(std::io::Error::other(e.to_string())))?;
            if !entry.file_type().is_file() || !self.has_artifact_extension(entry.path()) {
                continue;
            }
            let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some(timestamp) = parse_artifact_timestamp(stem, key) else {
                continue;
            };
            if window.contains(&timestamp) {
                artifacts.push(Artifact {
                    path: entry.path().to_path_buf(),
                    timestamp,
                });
            }
        }

        artifacts.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.path.cmp(&b.path)));

        if let Some(max) = self.max_frames {
            if artifacts.len() > max {
                artifacts.drain(..artifacts.len() - max);
            }
        }

        debug!(count = artifacts.len(), start = %window.start, end = %window.end, "Selected artifacts");
        Ok(artifacts)
    }

    /// The newest eligible artifact, if any.
    pub fn best_file(
        &self,
        key: &str,
        dir: &Path,
        lookback_secs: u32,
        end_time: &EndTime,
        now: DateTime<Utc>,
    ) -> ViewerResult<Option<Artifact>> {
        Ok(self.select(key, dir, lookback_secs, end_time, now)?.pop())
    }

    fn has_artifact_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|known| known.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }
}

/// Parse the timestamp out of an artifact file stem belonging to `key`.
///
/// The stem must be `key`, an optional single `_`, `.` or `-`, then a
/// timestamp in `YYYYMMDD_hhmmss` or `YYYYMMDDhhmmss` form.
pub fn parse_artifact_timestamp(stem: &str, key: &str) -> Option<DateTime<Utc>> {
    let rest = stem.strip_prefix(key)?;
    let rest = rest
        .strip_prefix(|c| c == '_' || c == '.' || c == '-')
        .unwrap_or(rest);

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(rest, fmt).ok())
        .map(|ndt| ndt.and_utc())
}
