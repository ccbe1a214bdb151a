//! Shared test utilities for the product viewer workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Artifact directory generators (time-stamped product images on disk)
//! - Canned product documents and parameters
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
