//! Product description server.

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use product_api::{create_router, AppState, CatalogConfig};

#[derive(Parser, Debug)]
#[command(name = "product-api")]
#[command(about = "Serves animation frame lists and cross-section images")]
struct Args {
    /// Listen address
    #[arg(short, long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    listen: String,

    /// Product catalog file
    #[arg(short, long, env = "PRODUCT_CATALOG", default_value = "config/products.yaml")]
    catalog: PathBuf,

    /// Override the catalog's data root
    #[arg(long, env = "DATA_ROOT")]
    data_root: Option<PathBuf>,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .json()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    let mut catalog = CatalogConfig::load(&args.catalog)?;
    if let Some(root) = args.data_root {
        catalog.data_root = root;
    }
    info!(data_root = %catalog.data_root.display(), "Starting product service");

    let state = Arc::new(AppState::new(catalog).with_prometheus(prometheus_handle));
    let shutdown = state.shutdown.clone();
    let app = create_router(state);

    let addr: SocketAddr = args.listen.parse().context("Invalid listen address")?;
    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
            let _ = shutdown.send(());
        })
        .await?;

    Ok(())
}
