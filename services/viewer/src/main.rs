//! Headless animation viewer.
//!
//! Polls the product service, cycles frames on the usual timing, and takes
//! playback and form commands one per line on stdin.

mod display;
mod input;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use viewer_engine::{run_viewer, AnimationEngine, HttpProductClient, ViewerConfig};

use display::LogDisplay;
use input::parse_command;

#[derive(Parser, Debug)]
#[command(name = "viewer")]
#[command(about = "Animate product frames from the product service")]
struct Args {
    /// Viewer configuration file (YAML)
    #[arg(short, long, env = "VIEWER_CONFIG")]
    config: Option<PathBuf>,

    /// Product endpoint, overrides the configuration file
    #[arg(long, env = "PRODUCT_URL")]
    product_url: Option<String>,

    /// Start playing immediately
    #[arg(long)]
    play: bool,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

fn load_config(path: Option<&PathBuf>) -> Result<ViewerConfig> {
    let Some(path) = path else {
        return Ok(ViewerConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read viewer config {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("Failed to parse viewer config {}", path.display()))
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

    let mut config = load_config(args.config.as_ref())?;
    if let Some(url) = args.product_url {
        config.product_url = url;
    }
    info!(product_url = %config.product_url, defaults = %config.defaults.to_query_string(), "Starting viewer");

    let client = HttpProductClient::new(config.product_url.clone())?;
    let mut engine = AnimationEngine::new(&config);
    if args.play {
        engine.set_mode(viewer_engine::PlaybackMode::Play);
    }

    let (command_tx, command_rx) = mpsc::channel(32);
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match parse_command(&line) {
                Ok(Some(command)) => {
                    if command_tx.send(command).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!(input = %line, "Ignoring command: {}", e),
            }
        }
    });

    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutdown requested");
        let _ = shutdown_tx.send(());
    });

    let summary = run_viewer(engine, Arc::new(client), LogDisplay::default(), command_rx, shutdown_rx).await;
    info!(
        ticks = summary.ticks,
        fetches = summary.fetches_issued,
        failed = summary.fetches_failed,
        "Viewer stopped"
    );
    Ok(())
}
