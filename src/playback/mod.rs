//! Playback engine seam.
//!
//! # Overview
//!
//! [`AudioPlayer`] is the interface the tile controller uses to play a
//! recorded artifact. It is deliberately narrow: `open` resolves the
//! artifact and claims the output device, `start` begins playback, and
//! `release` tears the session down. Release is mandatory exactly once per
//! successful open, including on abnormal teardown, and is a no-op when
//! nothing is open.
//!
//! A successfully started playthrough emits exactly one completion event
//! ([`TileEvent::PlaybackFinished`]) into the controller's queue, unless
//! `release` is called first, which suppresses it.
//!
//! [`RodioPlayer`](rodio::RodioPlayer) is the production implementation.
//! `MockPlayer` (available under `#[cfg(test)]`) records calls into a
//! shared log so tests can assert open/start/release counts.

use async_trait::async_trait;
use thiserror::Error;

use crate::backend::AudioArtifact;

pub mod rodio;

pub use self::rodio::RodioPlayer;

// ---------------------------------------------------------------------------
// PlaybackError
// ---------------------------------------------------------------------------

/// Errors from the playback subsystem.
#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    /// The artifact could not be resolved or decoded, or the output device
    /// was unavailable.
    #[error("could not open artifact for playback: {0}")]
    OpenFailed(String),

    /// A session is already open; release it before opening another.
    #[error("playback engine is busy")]
    Busy,

    /// `start` was called with no open session.
    #[error("no open playback session")]
    NotOpen,

    /// The playback engine is gone (its thread or task has exited).
    #[error("playback engine disconnected")]
    Disconnected,
}

// ---------------------------------------------------------------------------
// AudioPlayer trait
// ---------------------------------------------------------------------------

/// Interface for the media playback engine.
///
/// `Send` so the controller holding a `Box<dyn AudioPlayer>` can move
/// across tasks. Async because implementations confirm each command with
/// the thread that owns the actual output device.
#[async_trait]
pub trait AudioPlayer: Send {
    /// Open `artifact` and claim the output device.
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::OpenFailed`]: artifact missing/undecodable or no
    ///   output device.
    /// - [`PlaybackError::Busy`]: a previous session is still open.
    async fn open(&mut self, artifact: &AudioArtifact) -> Result<(), PlaybackError>;

    /// Begin playing the open session.
    async fn start(&mut self) -> Result<(), PlaybackError>;

    /// Stop playback and release the session. Idempotent; suppresses the
    /// completion event of a session that is still playing.
    async fn release(&mut self);
}

// ---------------------------------------------------------------------------
// MockPlayer  (test-only)
// ---------------------------------------------------------------------------

/// Call log shared between a [`MockPlayer`] and the test that owns it.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct PlayerLog {
    /// URIs passed to successful `open` calls.
    pub opened: Vec<String>,
    pub starts: usize,
    /// Releases of an actually-open session (no-op releases not counted).
    pub releases: usize,
}

/// Test double for [`AudioPlayer`].
///
/// Completion events are not emitted by the mock; controller tests inject
/// `TileEvent::PlaybackFinished` directly to model them.
#[cfg(test)]
pub struct MockPlayer {
    log: std::sync::Arc<std::sync::Mutex<PlayerLog>>,
    fail_open: bool,
    open: bool,
}

#[cfg(test)]
impl MockPlayer {
    /// A player whose opens always succeed. Returns the player and the
    /// shared call log.
    pub fn new() -> (Self, std::sync::Arc<std::sync::Mutex<PlayerLog>>) {
        let log = std::sync::Arc::new(std::sync::Mutex::new(PlayerLog::default()));
        (
            Self {
                log: std::sync::Arc::clone(&log),
                fail_open: false,
                open: false,
            },
            log,
        )
    }

    /// A player whose every `open` fails with [`PlaybackError::OpenFailed`].
    pub fn failing() -> (Self, std::sync::Arc<std::sync::Mutex<PlayerLog>>) {
        let (mut player, log) = Self::new();
        player.fail_open = true;
        (player, log)
    }
}

#[cfg(test)]
#[async_trait]
impl AudioPlayer for MockPlayer {
    async fn open(&mut self, artifact: &AudioArtifact) -> Result<(), PlaybackError> {
        if self.fail_open {
            return Err(PlaybackError::OpenFailed("mock open failure".into()));
        }
        if self.open {
            return Err(PlaybackError::Busy);
        }
        self.open = true;
        self.log
            .lock()
            .unwrap()
            .opened
            .push(artifact.as_uri().to_string());
        Ok(())
    }

    async fn start(&mut self) -> Result<(), PlaybackError> {
        if !self.open {
            return Err(PlaybackError::NotOpen);
        }
        self.log.lock().unwrap().starts += 1;
        Ok(())
    }

    async fn release(&mut self) {
        if self.open {
            self.open = false;
            self.log.lock().unwrap().releases += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_tracks_full_session_lifecycle() {
        let (mut player, log) = MockPlayer::new();
        let artifact = AudioArtifact::new("file:///tmp/clip.wav");

        player.open(&artifact).await.unwrap();
        player.start().await.unwrap();
        player.release().await;
        // Second release is a no-op.
        player.release().await;

        let log = log.lock().unwrap();
        assert_eq!(log.opened, vec!["file:///tmp/clip.wav".to_string()]);
        assert_eq!(log.starts, 1);
        assert_eq!(log.releases, 1);
    }

    #[tokio::test]
    async fn mock_open_twice_is_busy() {
        let (mut player, _log) = MockPlayer::new();
        let artifact = AudioArtifact::new("/tmp/clip.wav");
        player.open(&artifact).await.unwrap();
        assert!(matches!(
            player.open(&artifact).await,
            Err(PlaybackError::Busy)
        ));
    }

    #[tokio::test]
    async fn mock_start_without_open_is_not_open() {
        let (mut player, _log) = MockPlayer::new();
        assert!(matches!(player.start().await, Err(PlaybackError::NotOpen)));
    }

    #[tokio::test]
    async fn failing_mock_reports_open_failed() {
        let (mut player, log) = MockPlayer::failing();
        let artifact = AudioArtifact::new("/tmp/clip.wav");
        assert!(matches!(
            player.open(&artifact).await,
            Err(PlaybackError::OpenFailed(_))
        ));
        assert!(log.lock().unwrap().opened.is_empty());
    }

    #[test]
    fn playback_error_display_mentions_cause() {
        let e = PlaybackError::OpenFailed("no such file".into());
        assert!(e.to_string().contains("no such file"));
    }
}
