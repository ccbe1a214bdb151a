//! Application state and shared resources.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use product_selector::ProductSelector;
use tokio::sync::broadcast;
use xsection::XsectionClient;

use crate::config::CatalogConfig;
use crate::metrics::MetricsCollector;

/// Shared application state.
pub struct AppState {
    pub catalog: CatalogConfig,
    pub selector: ProductSelector,
    pub xsection: Option<XsectionClient>,
    pub metrics: Arc<MetricsCollector>,
    pub prometheus: Option<PrometheusHandle>,
    /// Fired on shutdown so pending cross-section waits return promptly
    pub shutdown: broadcast::Sender<()>,
}

impl AppState {
    pub fn new(catalog: CatalogConfig) -> Self {
        let mut selector = ProductSelector::new(catalog.extensions.clone());
        if let Some(max) = catalog.max_frames {
            selector = selector.with_max_frames(max);
        }
        let xsection = catalog
            .xsection
            .as_ref()
            .map(|xs| XsectionClient::new(xs.to_client_config()));
        let (shutdown, _) = broadcast::channel(1);

        Self {
            catalog,
            selector,
            xsection,
            metrics: Arc::new(MetricsCollector::new()),
            prometheus: None,
            shutdown,
        }
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}
