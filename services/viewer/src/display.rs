//! Display that writes every change to the log.

use tracing::{info, warn};
use viewer_common::ViewerError;
use viewer_engine::{ProductView, RenderFrame, ViewerDisplay};

#[derive(Debug, Default)]
pub struct LogDisplay {
    frames_shown: u64,
}

impl ViewerDisplay for LogDisplay {
    fn show_frame(&mut self, frame: &RenderFrame) {
        self.frames_shown += 1;
        info!(index = frame.index, url = %frame.url, shown = self.frames_shown, "Frame");
    }

    fn show_product(&mut self, product: &ProductView) {
        info!(
            title = %product.title,
            target = %product.target,
            zoom = %product.zoom,
            status = %product.status_html,
            "Product updated"
        );
    }

    fn notify(&mut self, notice: &ViewerError) {
        warn!(code = notice.code(), "{}", notice);
    }
}
