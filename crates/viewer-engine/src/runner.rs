//! Cooperative viewer loop.
//!
//! One task owns the engine. Ticks run strictly one after another, each
//! scheduled `wait` after the previous one finished. Between ticks the loop
//! applies user commands and fetch completions in arrival order. Fetches
//! run as their own tasks and are never cancelled, so when several are in
//! flight the last one to complete wins.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};
use viewer_common::{ProductResponse, ViewerResult};

use crate::client::ProductClient;
use crate::display::ViewerDisplay;
use crate::engine::{AnimationEngine, FetchRequest, TickOutcome};
use crate::form::FormEvent;
use crate::playback::PlaybackMode;

/// Input from the user.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerCommand {
    SetMode(PlaybackMode),
    Form(FormEvent),
}

/// Counters reported when the loop exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub fetches_issued: u64,
    pub fetches_completed: u64,
    pub fetches_failed: u64,
}

struct FetchCompletion {
    request: FetchRequest,
    result: ViewerResult<ProductResponse>,
}

/// Drive `engine` until `shutdown` fires (or its sender is dropped).
pub async fn run_viewer<D: ViewerDisplay>(
    mut engine: AnimationEngine,
    client: Arc<dyn ProductClient>,
    mut display: D,
    mut commands: mpsc::Receiver<ViewerCommand>,
    mut shutdown: broadcast::Receiver<()>,
) -> RunSummary {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<FetchCompletion>();
    let mut summary = RunSummary::default();
    let mut next_tick = Instant::now();

    info!("Starting viewer loop");

    'run: loop {
        let sleep = sleep_until(next_tick);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep => break,
                Some(command) = commands.recv() => {
                    if let Some(request) = apply_command(&mut engine, command) {
                        spawn_fetch(client.clone(), request, done_tx.clone());
                        summary.fetches_issued += 1;
                    }
                }
                Some(done) = done_rx.recv() => {
                    summary.fetches_completed += 1;
                    debug!(reason = ?done.request.reason, "Fetch completed");
                    match done.result {
                        Ok(response) => {
                            let view = engine.on_fetch_success(response);
                            display.show_product(view);
                        }
                        Err(e) => {
                            summary.fetches_failed += 1;
                            let notice = engine.on_fetch_error(e);
                            display.notify(&notice);
                        }
                    }
                }
                _ = shutdown.recv() => {
                    info!("Received shutdown signal");
                    break 'run;
                }
            }
        }

        let TickOutcome {
            fetch,
            render,
            notices,
            wait,
        } = engine.tick(Instant::now());
        summary.ticks += 1;

        for notice in &notices {
            display.notify(notice);
        }
        if let Some(request) = fetch {
            spawn_fetch(client.clone(), request, done_tx.clone());
            summary.fetches_issued += 1;
        }
        if let Some(frame) = render {
            display.show_frame(&frame);
        }

        next_tick = Instant::now() + wait;
    }

    info!(
        ticks = summary.ticks,
        fetches = summary.fetches_issued,
        failed = summary.fetches_failed,
        "Viewer loop stopped"
    );
    summary
}

fn apply_command(engine: &mut AnimationEngine, command: ViewerCommand) -> Option<FetchRequest> {
    match command {
        ViewerCommand::SetMode(mode) => {
            engine.set_mode(mode);
            None
        }
        ViewerCommand::Form(event) => engine.apply_form_event(event, Instant::now()),
    }
}

fn spawn_fetch(
    client: Arc<dyn ProductClient>,
    request: FetchRequest,
    done: mpsc::UnboundedSender<FetchCompletion>,
) {
    tokio::spawn(async move {
        let result = client.fetch(&request.params).await;
        if done.send(FetchCompletion { request, result }).is_err() {
            warn!("Viewer loop gone before fetch completed");
        }
    });
}
