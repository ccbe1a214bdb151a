//! Product description service.
//!
//! Serves `/product` frame lists for the animation viewer, the `/xsection`
//! cross-section bridge, and the artifact files themselves.

pub mod config;
pub mod describe;
pub mod handlers;
pub mod metrics;
pub mod state;

use std::sync::Arc;

use axum::{extract::Extension, routing::get, Router};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub use config::{CatalogConfig, ProductConfig, XsectionSettings};
pub use describe::describe_product;
pub use state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/product", get(handlers::product_handler))
        .route("/xsection", get(handlers::xsection_handler))
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/api/metrics", get(handlers::api_metrics_handler))
        .nest_service(
            state.catalog.url_prefix.trim_end_matches('/'),
            ServeDir::new(&state.catalog.data_root),
        );

    if let Some(xs) = &state.catalog.xsection {
        app = app.nest_service(xs.image_url_prefix.trim_end_matches('/'), ServeDir::new(&xs.image_dir));
    }

    app.layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
