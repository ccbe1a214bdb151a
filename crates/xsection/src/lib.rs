//! Cross-section rendering through the display's remote-control queue.
//!
//! A request is written as a line-oriented command file that a separate
//! ingester picks up. The ingester renders and drops PNGs at predictable
//! paths; we poll for them with a bounded, cancellable wait.

mod command;
mod poll;
mod queue;
mod render;

pub use command::{PlanView, XsCommand, XsectionRequest};
pub use poll::{wait_for_artifact, DEFAULT_POLL_INTERVAL};
pub use queue::CommandQueue;
pub use render::{RenderedImages, XsectionClient, XsectionConfig};
