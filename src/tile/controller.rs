//! The tile controller: a serial state machine over one event queue.
//!
//! # Architecture
//!
//! [`TileController`] owns the [`RecordingState`], the stored artifact and
//! the auto-stop timer, and holds its collaborators behind trait objects:
//! an `Arc<dyn RecordingBackend>` for fire-and-forget commands and a
//! `Box<dyn AudioPlayer>` for playback. [`run`](TileController::run)
//! drains a single `mpsc::Receiver<TileEvent>`; because every input goes
//! through that queue, handlers run strictly one at a time and mutate
//! state without any locking.
//!
//! Asynchronous answers come back as events on the same queue:
//!
//! * the status subscription is a spawned forwarder pushing
//!   [`TileEvent::Status`],
//! * each query reply handle is awaited by a short-lived task pushing
//!   [`TileEvent::Resync`],
//! * the auto-stop timer posts [`TileEvent::AutoStopElapsed`],
//! * the playback engine posts [`TileEvent::PlaybackFinished`].
//!
//! No handler propagates an error. Failures are logged, recorded in
//! `last_error`, and leave the machine in a valid state.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::backend::{AudioArtifact, QueryResponse, QueryStatus, RecordingBackend, StatusEvent};
use crate::config::TileConfig;
use crate::playback::AudioPlayer;
use crate::timer::AutoStopTimer;

use super::event::TileEvent;
use super::render::{render, TileView};
use super::state::RecordingState;

// ---------------------------------------------------------------------------
// TileHandle
// ---------------------------------------------------------------------------

/// The host-facing side of a running controller: an event sender and the
/// rendered view.
#[derive(Clone)]
pub struct TileHandle {
    pub events: mpsc::Sender<TileEvent>,
    pub view: watch::Receiver<TileView>,
}

// ---------------------------------------------------------------------------
// TileController
// ---------------------------------------------------------------------------

/// Drives the record/playback tile.
///
/// Create with [`TileController::new`], then either spawn
/// [`run`](Self::run) with the receiving end of the event channel, or feed
/// events directly through [`handle_event`](Self::handle_event).
pub struct TileController {
    state: RecordingState,
    /// The most recent completed recording. `None` means no recording has
    /// ever finished in this controller's lifetime, which is the only
    /// situation in which the state may be `NoRecording`.
    artifact: Option<AudioArtifact>,
    config: TileConfig,
    backend: Arc<dyn RecordingBackend>,
    player: Box<dyn AudioPlayer>,
    timer: AutoStopTimer,
    /// Clone of the queue's sender, handed to the timer and reply tasks.
    events_tx: mpsc::Sender<TileEvent>,
    view_tx: watch::Sender<TileView>,
    /// Forwarder task for the status subscription; `Some` while active.
    status_forwarder: Option<JoinHandle<()>>,
    last_error: Option<String>,
}

impl TileController {
    /// Build a controller around an already-wired event channel.
    ///
    /// `events_tx` must be a sender for the same channel whose receiver is
    /// later passed to [`run`](Self::run): the timer, the status forwarder
    /// and query-reply tasks all post back through it.
    pub fn new(
        config: TileConfig,
        backend: Arc<dyn RecordingBackend>,
        player: Box<dyn AudioPlayer>,
        events_tx: mpsc::Sender<TileEvent>,
        view_tx: watch::Sender<TileView>,
    ) -> Self {
        Self {
            state: RecordingState::default(),
            artifact: None,
            config,
            backend,
            player,
            timer: AutoStopTimer::new(),
            events_tx,
            view_tx,
            status_forwarder: None,
            last_error: None,
        }
    }

    // -- accessors ----------------------------------------------------------

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn artifact(&self) -> Option<&AudioArtifact> {
        self.artifact.as_ref()
    }

    /// The most recent diagnostic, if any handler reported one.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether the auto-stop timer is armed.
    pub fn auto_stop_pending(&self) -> bool {
        self.timer.is_pending()
    }

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------

    /// Run until a [`TileEvent::Destroy`] arrives or the channel closes,
    /// then tear down: force-stop an in-progress recording, cancel the
    /// timer, release playback, drop the subscription.
    pub async fn run(mut self, mut events: mpsc::Receiver<TileEvent>) {
        while let Some(event) = events.recv().await {
            if !self.handle_event(event).await {
                break;
            }
        }
        self.shutdown().await;
    }

    /// Advance the state machine by one event and re-render.
    ///
    /// Returns `false` once the controller should shut down. Events are
    /// idempotent: re-delivering the same event in the same state changes
    /// nothing besides the re-render.
    pub async fn handle_event(&mut self, event: TileEvent) -> bool {
        log::debug!("tile event {event:?} in state {:?}", self.state);

        let mut keep_running = true;
        match event {
            TileEvent::Click => self.on_click().await,
            TileEvent::LongClick => self.on_long_click(),
            TileEvent::Activate => self.on_activate(),
            TileEvent::Deactivate => self.on_deactivate(),
            TileEvent::Destroy => keep_running = false,
            TileEvent::Status(status) => self.on_status(status).await,
            TileEvent::Resync(response) => self.on_resync(response),
            TileEvent::AutoStopElapsed => self.on_auto_stop(),
            TileEvent::PlaybackFinished => self.on_playback_finished().await,
            TileEvent::ConfigChanged(update) => self.config.apply(update),
        }

        self.view_tx.send_replace(render(self.state));
        keep_running
    }

    // -----------------------------------------------------------------------
    // User input
    // -----------------------------------------------------------------------

    async fn on_click(&mut self) {
        match self.state {
            RecordingState::Recording => {
                // Intent only; the state moves when the backend confirms.
                if let Err(e) = self.backend.stop_recording() {
                    self.report(format!("stop command failed: {e}"));
                }
            }
            RecordingState::NoRecording => {
                // Nothing to play yet; the short-press action is disabled.
            }
            RecordingState::Idle | RecordingState::JustRecorded => self.start_playback().await,
            RecordingState::Playing => self.stop_playback().await,
        }
    }

    fn on_long_click(&mut self) {
        if !self.state.can_record() {
            // Already recording (or playing); no duplicate start command.
            return;
        }
        if let Err(e) = self.backend.start_recording(self.config.quality) {
            self.report(format!("start command failed: {e}"));
        }
        // Recording is entered only once the backend broadcasts Started.
    }

    // -----------------------------------------------------------------------
    // Backend events
    // -----------------------------------------------------------------------

    async fn on_status(&mut self, status: StatusEvent) {
        let was_playing = self.state == RecordingState::Playing;
        match status {
            StatusEvent::Started => {
                if self.state != RecordingState::Recording {
                    self.state = RecordingState::Recording;
                    if let Some(delay) = self.config.auto_stop_delay() {
                        self.timer.schedule(delay, self.events_tx.clone());
                    }
                }
            }

            StatusEvent::Stopped { artifact } => {
                self.timer.cancel();
                if artifact.is_some() {
                    self.artifact = artifact;
                }
                self.state = RecordingState::JustRecorded;
            }

            StatusEvent::Idle => {
                self.timer.cancel();
                self.state = self.resting_state();
            }

            StatusEvent::Error { message } => {
                self.timer.cancel();
                self.report(format!("recording backend error: {message}"));
                self.state = self.resting_state();
            }
        }

        if was_playing && self.state != RecordingState::Playing {
            // Backend truth displaced local playback; drop the session so
            // the audio stops with the state.
            self.player.release().await;
        }
    }

    /// Reply to the status query issued on activation.
    ///
    /// The query reports the record axis only, so a reply that races
    /// locally-driven playback is dropped wholesale rather than clobbering
    /// `Playing` with a stale answer.
    fn on_resync(&mut self, response: QueryResponse) {
        if self.state == RecordingState::Playing {
            log::debug!("resync ignored while playing");
            return;
        }
        if response.artifact.is_some() {
            self.artifact = response.artifact;
        }
        self.state = match response.status {
            QueryStatus::Idle => self.resting_state(),
            // Unlike a live Started broadcast, a query answer does not arm
            // the auto-stop timer.
            QueryStatus::Started => RecordingState::Recording,
            QueryStatus::Stopped => RecordingState::JustRecorded,
        };
    }

    /// The resting state honours the artifact axis: `NoRecording` exists
    /// only before the first completed recording.
    fn resting_state(&self) -> RecordingState {
        if self.artifact.is_some() {
            RecordingState::Idle
        } else {
            RecordingState::NoRecording
        }
    }

    // -----------------------------------------------------------------------
    // Timer / playback events
    // -----------------------------------------------------------------------

    fn on_auto_stop(&mut self) {
        if self.state != RecordingState::Recording {
            // The fire raced a manual stop; nothing left to do.
            return;
        }
        log::info!("auto-stop timeout reached, stopping recording");
        if let Err(e) = self.backend.stop_recording() {
            self.report(format!("auto-stop command failed: {e}"));
        }
    }

    async fn on_playback_finished(&mut self) {
        // Release unconditionally so an open session can never leak.
        self.player.release().await;
        if self.state == RecordingState::Playing {
            self.state = RecordingState::Idle;
        }
    }

    // -----------------------------------------------------------------------
    // Playback control
    // -----------------------------------------------------------------------

    async fn start_playback(&mut self) {
        let Some(artifact) = self.artifact.clone() else {
            self.report("no recording available to play".into());
            return;
        };
        if let Err(e) = self.player.open(&artifact).await {
            // Stay in the pre-click state.
            self.report(format!("playback open failed: {e}"));
            return;
        }
        if let Err(e) = self.player.start().await {
            self.player.release().await;
            self.report(format!("playback start failed: {e}"));
            return;
        }
        self.state = RecordingState::Playing;
    }

    async fn stop_playback(&mut self) {
        // Explicit stop; the engine suppresses the completion event.
        self.player.release().await;
        self.state = RecordingState::Idle;
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    fn on_activate(&mut self) {
        if self.status_forwarder.is_none() {
            let mut status = self.backend.subscribe();
            let events = self.events_tx.clone();
            self.status_forwarder = Some(tokio::spawn(async move {
                loop {
                    match status.recv().await {
                        Ok(event) => {
                            if events.send(TileEvent::Status(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            log::warn!("status channel lagged, skipped {skipped} events");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }));
        }
        self.request_resync();
    }

    fn on_deactivate(&mut self) {
        if let Some(forwarder) = self.status_forwarder.take() {
            forwarder.abort();
        }
    }

    fn request_resync(&mut self) {
        let (reply_tx, reply_rx) = oneshot::channel();
        match self.backend.query_status(reply_tx) {
            Ok(()) => {
                let events = self.events_tx.clone();
                tokio::spawn(async move {
                    // Either end may be gone by the time the reply lands;
                    // late replies are discarded, never an error.
                    if let Ok(response) = reply_rx.await {
                        let _ = events.send(TileEvent::Resync(response)).await;
                    }
                });
            }
            Err(e) => self.report(format!("status query failed: {e}")),
        }
    }

    async fn shutdown(&mut self) {
        if self.state == RecordingState::Recording {
            if let Err(e) = self.backend.stop_recording() {
                log::warn!("force-stop on teardown failed: {e}");
            }
        }
        self.timer.cancel();
        self.player.release().await;
        self.on_deactivate();
        log::debug!("tile controller shut down");
    }

    // -----------------------------------------------------------------------
    // Diagnostics
    // -----------------------------------------------------------------------

    fn report(&mut self, message: String) {
        log::error!("{message}");
        self.last_error = Some(message);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
