//! Tile recording state.
//!
//! [`RecordingState`] is the closed set of states the tile can be in.
//! Exactly one value is active at any time, and only the controller ever
//! writes it; every transition happens inside the serial event handler.
//!
//! The state machine transitions are:
//!
//! ```text
//! NoRecording ──long-press + Started──▶ Recording
//! Idle / JustRecorded ──long-press + Started──▶ Recording
//! Recording ──Stopped(artifact)──▶ JustRecorded
//! Recording ──Idle──▶ Idle (NoRecording when no artifact was ever stored)
//! Idle / JustRecorded ──short-press──▶ Playing
//! Playing ──short-press / completion──▶ Idle
//! any ──Error──▶ Idle (NoRecording when no artifact was ever stored)
//! ```

/// States of the record/playback tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    /// No recording exists yet; the short-press action is disabled.
    NoRecording,
    /// At rest with a stored recording available for playback.
    Idle,
    /// The backend is capturing audio.
    Recording,
    /// A recording just completed; short-press plays it back.
    JustRecorded,
    /// The stored recording is playing.
    Playing,
}

impl RecordingState {
    /// Whether a short-press starts playback in this state.
    pub fn can_play(self) -> bool {
        matches!(self, RecordingState::Idle | RecordingState::JustRecorded)
    }

    /// Whether a long-press may issue a start-recording command.
    pub fn can_record(self) -> bool {
        matches!(
            self,
            RecordingState::NoRecording | RecordingState::Idle | RecordingState::JustRecorded
        )
    }
}

impl Default for RecordingState {
    fn default() -> Self {
        RecordingState::NoRecording
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
