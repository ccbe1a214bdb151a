//! Best-file selection for periodically regenerated product images.
//!
//! Artifacts are plain files whose stem is the selection key followed by a
//! UTC timestamp, e.g. `CTI_VEL_20240601_120500.png` or
//! `CTI_VEL.20240601120500.gif`. Selection is a read-only directory listing:
//! the same directory contents and inputs always produce the same answer.

mod selector;

pub use selector::{parse_artifact_timestamp, Artifact, ProductSelector, DEFAULT_EXTENSIONS};
