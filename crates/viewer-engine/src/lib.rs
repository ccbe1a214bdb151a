//! Client side of the product viewer.
//!
//! - [`engine::AnimationEngine`]: playback state machine driven by `tick`
//! - [`client::ProductClient`]: fetches product descriptions
//! - [`form::FormController`]: maps control changes onto query parameters
//! - [`runner::run_viewer`]: the cooperative loop tying them together

pub mod client;
pub mod config;
pub mod display;
pub mod engine;
pub mod form;
pub mod playback;
pub mod runner;

pub use client::{HttpProductClient, ProductClient};
pub use config::ViewerConfig;
pub use display::ViewerDisplay;
pub use engine::{AnimationEngine, FetchReason, FetchRequest, ProductView, RenderFrame, TickOutcome};
pub use form::{FormController, FormEvent};
pub use playback::{PlaybackMode, PlaybackState};
pub use runner::{run_viewer, RunSummary, ViewerCommand};
