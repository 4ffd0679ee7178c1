//! Presentation adapter: pure mapping from state to the tile face.
//!
//! [`render`] is the only way a [`RecordingState`] becomes something
//! presentable. It is total over the five states and has no side effects;
//! the hosting presentation layer consumes the resulting [`TileView`] and
//! nothing else.

use super::state::RecordingState;

// ---------------------------------------------------------------------------
// TileIcon / TileView
// ---------------------------------------------------------------------------

/// Icon identifier consumed by the hosting tile framework.
///
/// `NoRecording` and `Idle` share the generic record glyph; their labels
/// differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileIcon {
    Record,
    Recording,
    Recorded,
    Playing,
}

/// The rendered tile face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileView {
    pub label: &'static str,
    pub icon: TileIcon,
}

// ---------------------------------------------------------------------------
// render
// ---------------------------------------------------------------------------

/// Map a state to its label/icon pair.
pub fn render(state: RecordingState) -> TileView {
    match state {
        RecordingState::NoRecording => TileView {
            label: "No recording",
            icon: TileIcon::Record,
        },
        RecordingState::Idle => TileView {
            label: "Quick record",
            icon: TileIcon::Record,
        },
        RecordingState::Recording => TileView {
            label: "Recording\u{2026}",
            icon: TileIcon::Recording,
        },
        RecordingState::JustRecorded => TileView {
            label: "Recorded",
            icon: TileIcon::Recorded,
        },
        RecordingState::Playing => TileView {
            label: "Playing\u{2026}",
            icon: TileIcon::Playing,
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
