//! The surface the viewer draws on.

use viewer_common::ViewerError;

use crate::engine::{ProductView, RenderFrame};

/// Receives every visible change the viewer makes.
pub trait ViewerDisplay: Send {
    /// Replace the displayed image.
    fn show_frame(&mut self, frame: &RenderFrame);

    /// Mount fresh product and status fragments at `product.target`.
    fn show_product(&mut self, product: &ProductView);

    /// Surface an error or warning to the user.
    fn notify(&mut self, notice: &ViewerError);
}
