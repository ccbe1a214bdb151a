use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tracing::{info, instrument};
use viewer_common::{ViewerError, ViewerResult};

use crate::command::XsectionRequest;
use crate::poll::{wait_for_artifact, DEFAULT_POLL_INTERVAL};
use crate::queue::CommandQueue;

/// Where requests go and how long to wait for results.
#[derive(Debug, Clone)]
pub struct XsectionConfig {
    pub queue_file: PathBuf,
    /// Directory the ingester drops `<image_name>.png` into
    pub image_dir: PathBuf,
    pub poll_interval: Duration,
    /// Budget for the vertical (main) image
    pub main_timeout: Duration,
    /// Budget for the plan-view image, counted after the main image arrives
    pub plan_timeout: Duration,
}

impl XsectionConfig {
    pub fn new(queue_file: impl Into<PathBuf>, image_dir: impl Into<PathBuf>) -> Self {
        Self {
            queue_file: queue_file.into(),
            image_dir: image_dir.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            main_timeout: Duration::from_secs(12),
            plan_timeout: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImages {
    pub vertical: PathBuf,
    pub horizontal: Option<PathBuf>,
}

/// Submits cross-section requests and waits for the rendered images.
///
/// The ingester reads a single command file, so requests are handled one
/// at a time; clones share the same queue lock.
#[derive(Debug, Clone)]
pub struct XsectionClient {
    queue: CommandQueue,
    config: XsectionConfig,
    in_flight: Arc<Mutex<()>>,
}

impl XsectionClient {
    pub fn new(config: XsectionConfig) -> Self {
        Self {
            queue: CommandQueue::new(config.queue_file.clone()),
            config,
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    pub fn image_path(&self, image_name: &str) -> PathBuf {
        self.config.image_dir.join(format!("{}.png", image_name))
    }

    #[instrument(skip(self, request, shutdown), fields(field = %request.field, route = %request.route))]
    pub async fn render(
        &self,
        request: &XsectionRequest,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> ViewerResult<RenderedImages> {
        request.validate()?;

        let vertical_path = self.image_path(&request.image_name);
        let horizontal_path = request.plan_view.as_ref().map(|p| self.image_path(&p.image_name));

        // Held until both images are in
        let _guard = tokio::select! {
            biased;
            _ = shutdown.recv() => return Err(ViewerError::Cancelled),
            guard = self.in_flight.lock() => guard,
        };

        // Stale images from an earlier request would satisfy the poll at once
        remove_if_present(&vertical_path).await?;
        if let Some(path) = &horizontal_path {
            remove_if_present(path).await?;
        }

        self.queue.submit(&request.commands()).await?;

        let vertical = wait_for_artifact(
            &vertical_path,
            self.config.poll_interval,
            self.config.main_timeout,
            shutdown,
        )
        .await?;

        let horizontal = match horizontal_path {
            Some(path) => Some(
                wait_for_artifact(&path, self.config.poll_interval, self.config.plan_timeout, shutdown).await?,
            ),
            None => None,
        };

        info!(vertical = %vertical.display(), "Cross-section rendered");
        Ok(RenderedImages { vertical, horizontal })
    }
}

async fn remove_if_present(path: &Path) -> ViewerResult<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
