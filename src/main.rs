//! Demo binary: drives the tile controller from stdin.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`TileConfig`] from disk (returns default on first run).
//! 3. Spawn the simulated recording backend.
//! 4. Spawn the rodio playback engine on its own thread.
//! 5. Wire the event queue and view channel, spawn the controller.
//! 6. Activate the tile, then read commands from stdin until `quit`
//!    or Ctrl-C.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};

use quick_record::{
    backend::sim::SimulatedRecorder,
    config::AppPaths,
    playback::RodioPlayer,
    tile::{render, RecordingState, TileController, TileEvent, TileHandle},
    RecordingBackend, TileConfig,
};

const HELP: &str = "\
commands:
  c, click       short-press the tile
  l, long        long-press the tile
  a, activate    bring the tile into view
  d, deactivate  hide the tile
  q, quit        destroy the tile and exit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("quick-record demo starting up");

    // 2. Configuration
    let config = TileConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        TileConfig::default()
    });

    // 3. Simulated recording backend
    let paths = AppPaths::new();
    let clip_uri = format!(
        "file://{}",
        paths.recordings_dir.join("quick-record-demo.wav").display()
    );
    let backend: Arc<dyn RecordingBackend> = Arc::new(SimulatedRecorder::spawn(clip_uri));

    // 4 + 5. Playback engine, channels, controller
    let (events_tx, events_rx) = mpsc::channel::<TileEvent>(16);
    let (view_tx, view_rx) = watch::channel(render(RecordingState::default()));

    let player = RodioPlayer::spawn(events_tx.clone());
    let controller = TileController::new(
        config,
        backend,
        Box::new(player),
        events_tx.clone(),
        view_tx,
    );
    let controller_task = tokio::spawn(controller.run(events_rx));

    let handle = TileHandle {
        events: events_tx,
        view: view_rx,
    };

    // Print the tile face whenever it changes.
    let mut view = handle.view.clone();
    tokio::spawn(async move {
        loop {
            let face = *view.borrow_and_update();
            println!("[tile] {} ({:?})", face.label, face.icon);
            if view.changed().await.is_err() {
                break;
            }
        }
    });

    // 6. Drive the tile from stdin.
    handle.events.send(TileEvent::Activate).await?;
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        let event = match line.trim() {
            "" => continue,
            "c" | "click" => TileEvent::Click,
            "l" | "long" => TileEvent::LongClick,
            "a" | "activate" => TileEvent::Activate,
            "d" | "deactivate" => TileEvent::Deactivate,
            "q" | "quit" => break,
            _ => {
                println!("{HELP}");
                continue;
            }
        };
        handle.events.send(event).await?;
    }

    handle.events.send(TileEvent::Destroy).await?;
    controller_task.await?;
    log::info!("quick-record demo shut down");
    Ok(())
}
