use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};
use viewer_common::{ViewerError, ViewerResult};

/// How often to look for a rendered image.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Wait until `path` exists, checking every `interval`.
///
/// Fails with `RenderTimeout` once `timeout` has passed without the file
/// appearing, or `Cancelled` as soon as `shutdown` fires.
pub async fn wait_for_artifact(
    path: &Path,
    interval: Duration,
    timeout: Duration,
    shutdown: &mut broadcast::Receiver<()>,
) -> ViewerResult<PathBuf> {
    let started = Instant::now();

    loop {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            debug!(path = %path.display(), elapsed_ms = started.elapsed().as_millis() as u64, "Artifact appeared");
            return Ok(path.to_path_buf());
        }

        let waited = started.elapsed();
        if waited >= timeout {
            warn!(path = %path.display(), timeout_ms = timeout.as_millis() as u64, "Artifact did not appear");
            return Err(ViewerError::RenderTimeout {
                path: path.to_path_buf(),
                waited: timeout,
            });
        }

        tokio::select! {
            _ = shutdown.recv() => return Err(ViewerError::Cancelled),
            _ = sleep(interval.min(timeout - waited)) => {}
        }
    }
}
