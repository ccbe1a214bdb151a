use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};
use viewer_common::ViewerResult;

use crate::command::XsCommand;

/// The command file the remote-control ingester watches.
#[derive(Debug, Clone)]
pub struct CommandQueue {
    path: PathBuf,
}

impl CommandQueue {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the command file with `commands`, one per line.
    ///
    /// Written to a sibling temp file and renamed, so the ingester never
    /// sees a half-written request.
    pub async fn submit(&self, commands: &[XsCommand]) -> ViewerResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut body = String::new();
        for command in commands {
            body.push_str(&command.to_string());
            body.push('\n');
        }

        let temp_path = self.path.with_extension("partial");
        fs::write(&temp_path, body).await?;
        fs::rename(&temp_path, &self.path).await?;

        debug!(lines = commands.len(), "Command file written");
        info!(path = %self.path.display(), "Submitted cross-section request");
        Ok(())
    }
}
