//! Viewer configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use viewer_common::QueryParameters;

/// Timing constants, realtime defaults and the product endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Full URL of the product endpoint, e.g. `http://localhost:8080/product`
    pub product_url: String,
    /// Parameters restored by the empty-archive fallback
    pub defaults: QueryParameters,
    /// Minimum time between realtime refreshes
    pub refresh_interval_secs: u64,
    /// Tick interval while advancing
    pub advance_millis: u64,
    /// Tick interval while Play sits on the newest frame
    pub dwell_millis: u64,
    /// Fields for which a height is meaningful
    pub volumetric_fields: Vec<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            product_url: "http://localhost:8080/product".to_string(),
            defaults: QueryParameters::default(),
            refresh_interval_secs: 60,
            advance_millis: 100,
            dwell_millis: 1000,
            volumetric_fields: Vec::new(),
        }
    }
}

impl ViewerConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn advance_wait(&self) -> Duration {
        Duration::from_millis(self.advance_millis)
    }

    pub fn dwell_wait(&self) -> Duration {
        Duration::from_millis(self.dwell_millis)
    }
}
