//! Rodio-backed playback engine.
//!
//! # Design
//!
//! `rodio::OutputStream` (and the `cpal` stream inside it) is `!Send`, so
//! it cannot live inside the controller task. [`RodioPlayer`] is a thin
//! `Send` handle; the stream and sink live on a **dedicated OS thread**
//! that processes open/start/release commands from a channel.
//!
//! While a session is playing, the thread polls the sink between commands;
//! when the sink drains it emits exactly one
//! [`TileEvent::PlaybackFinished`] into the controller's event queue.
//! `Release` drops the session before the drain check runs, which is what
//! suppresses the completion event on an explicit stop.
//!
//! The thread exits when the handle (and with it the command sender) is
//! dropped, releasing any open session with it.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use async_trait::async_trait;
use rodio::{Decoder, OutputStream, Sink};
use tokio::sync::{mpsc, oneshot};

use crate::backend::AudioArtifact;
use crate::tile::TileEvent;

use super::{AudioPlayer, PlaybackError};

/// How often the playback thread checks a playing sink for drain.
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

enum PlayerCommand {
    Open(std::path::PathBuf, oneshot::Sender<Result<(), PlaybackError>>),
    Start(oneshot::Sender<Result<(), PlaybackError>>),
    Release(oneshot::Sender<()>),
}

// ---------------------------------------------------------------------------
// RodioPlayer handle
// ---------------------------------------------------------------------------

/// `Send` front-end to the playback thread.
pub struct RodioPlayer {
    commands: Sender<PlayerCommand>,
}

impl RodioPlayer {
    /// Spawn the playback thread. Completion events are sent on `events`.
    pub fn spawn(events: mpsc::Sender<TileEvent>) -> Self {
        let (command_tx, command_rx) = std::sync::mpsc::channel();
        std::thread::Builder::new()
            .name("tile-playback".into())
            .spawn(move || player_thread(command_rx, events))
            .expect("failed to spawn tile-playback thread");
        Self {
            commands: command_tx,
        }
    }

    async fn round_trip<T>(
        &self,
        command: PlayerCommand,
        reply: oneshot::Receiver<T>,
    ) -> Result<T, PlaybackError> {
        self.commands
            .send(command)
            .map_err(|_| PlaybackError::Disconnected)?;
        reply.await.map_err(|_| PlaybackError::Disconnected)
    }
}

#[async_trait]
impl AudioPlayer for RodioPlayer {
    async fn open(&mut self, artifact: &AudioArtifact) -> Result<(), PlaybackError> {
        let (tx, rx) = oneshot::channel();
        self.round_trip(PlayerCommand::Open(artifact.file_path(), tx), rx)
            .await?
    }

    async fn start(&mut self) -> Result<(), PlaybackError> {
        let (tx, rx) = oneshot::channel();
        self.round_trip(PlayerCommand::Start(tx), rx).await?
    }

    async fn release(&mut self) {
        let (tx, rx) = oneshot::channel();
        // A dead thread has already dropped its session; nothing to do.
        let _ = self.round_trip(PlayerCommand::Release(tx), rx).await;
    }
}

// ---------------------------------------------------------------------------
// Playback thread
// ---------------------------------------------------------------------------

struct Session {
    // Keeps the output device alive for the lifetime of the sink.
    _stream: OutputStream,
    sink: Sink,
    playing: bool,
}

fn player_thread(commands: Receiver<PlayerCommand>, events: mpsc::Sender<TileEvent>) {
    let mut session: Option<Session> = None;

    loop {
        // Only poll-wait while something is playing; otherwise block until
        // the next command.
        let command = if session.as_ref().is_some_and(|s| s.playing) {
            match commands.recv_timeout(DRAIN_POLL_INTERVAL) {
                Ok(command) => Some(command),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match commands.recv() {
                Ok(command) => Some(command),
                Err(_) => break,
            }
        };

        match command {
            Some(PlayerCommand::Open(path, reply)) => {
                let result = if session.is_some() {
                    Err(PlaybackError::Busy)
                } else {
                    match open_session(&path) {
                        Ok(s) => {
                            session = Some(s);
                            Ok(())
                        }
                        Err(e) => Err(e),
                    }
                };
                let _ = reply.send(result);
            }

            Some(PlayerCommand::Start(reply)) => {
                let result = match session.as_mut() {
                    Some(s) => {
                        s.sink.play();
                        s.playing = true;
                        Ok(())
                    }
                    None => Err(PlaybackError::NotOpen),
                };
                let _ = reply.send(result);
            }

            Some(PlayerCommand::Release(reply)) => {
                if let Some(s) = session.take() {
                    s.sink.stop();
                }
                let _ = reply.send(());
            }

            None => {}
        }

        if session.as_ref().is_some_and(|s| s.playing && s.sink.empty()) {
            session = None;
            // Receiver gone means the controller was torn down; nothing to
            // notify.
            let _ = events.blocking_send(TileEvent::PlaybackFinished);
        }
    }

    log::debug!("tile-playback thread exiting");
}

fn open_session(path: &Path) -> Result<Session, PlaybackError> {
    let (stream, handle) =
        OutputStream::try_default().map_err(|e| PlaybackError::OpenFailed(e.to_string()))?;
    let sink = Sink::try_new(&handle).map_err(|e| PlaybackError::OpenFailed(e.to_string()))?;
    let file = File::open(path)
        .map_err(|e| PlaybackError::OpenFailed(format!("{}: {e}", path.display())))?;
    let source =
        Decoder::new(BufReader::new(file)).map_err(|e| PlaybackError::OpenFailed(e.to_string()))?;

    // Opened paused; playback begins on the explicit start command.
    sink.pause();
    sink.append(source);

    Ok(Session {
        _stream: stream,
        sink,
        playing: false,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // These tests need a real audio output device, so they are ignored by
    // default (same policy as other rodio-backed adapters).

    #[tokio::test]
    #[ignore = "requires audio hardware"]
    async fn open_missing_file_reports_open_failed() {
        let (events_tx, _events_rx) = mpsc::channel(4);
        let mut player = RodioPlayer::spawn(events_tx);
        let artifact = AudioArtifact::new("/nonexistent/clip.wav");
        assert!(matches!(
            player.open(&artifact).await,
            Err(PlaybackError::OpenFailed(_))
        ));
    }

    #[tokio::test]
    #[ignore = "requires audio hardware"]
    async fn start_without_open_reports_not_open() {
        let (events_tx, _events_rx) = mpsc::channel(4);
        let mut player = RodioPlayer::spawn(events_tx);
        assert!(matches!(player.start().await, Err(PlaybackError::NotOpen)));
    }

    #[tokio::test]
    #[ignore = "requires audio hardware"]
    async fn release_without_open_is_a_no_op() {
        let (events_tx, _events_rx) = mpsc::channel(4);
        let mut player = RodioPlayer::spawn(events_tx);
        player.release().await;
    }
}
