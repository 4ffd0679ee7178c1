//! The tile's single inbound event vocabulary.
//!
//! The original design delivered backend broadcasts, query replies, timer
//! fires and playback completion through separate callbacks mutating
//! shared fields. Here every input (user, backend, timer, player,
//! settings, lifecycle) is one [`TileEvent`] on one mpsc queue, processed
//! strictly in arrival order by the controller, which removes the races
//! without introducing locks.

use crate::backend::{QueryResponse, StatusEvent};
use crate::config::ConfigUpdate;

/// Everything that can happen to the tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileEvent {
    /// Short-press on the tile.
    Click,
    /// Long-press on the tile.
    LongClick,
    /// The tile became visible/active: subscribe to status broadcasts and
    /// resync from the backend.
    Activate,
    /// The tile went inactive: drop the status subscription.
    Deactivate,
    /// Tear the controller down; force-stops an in-progress recording and
    /// releases any open playback session.
    Destroy,
    /// Asynchronous status broadcast from the recording backend.
    Status(StatusEvent),
    /// Reply to an explicit status query issued on activation.
    Resync(QueryResponse),
    /// The auto-stop timer elapsed.
    AutoStopElapsed,
    /// The playback engine finished playing the artifact.
    PlaybackFinished,
    /// Partial settings update pushed from the configuration surface.
    ConfigChanged(ConfigUpdate),
}
