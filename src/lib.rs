//! quick-record: a record/playback tile controller.
//!
//! The crate drives a single interactive tile that toggles between audio
//! recording and playback. The core is [`tile::TileController`], a serial
//! state machine fed by one [`tokio::sync::mpsc`] event queue: user clicks,
//! backend status broadcasts, query replies, timer fires and playback
//! completion all arrive as [`tile::TileEvent`]s and are processed strictly
//! in order, so no locking is needed around the tile state.
//!
//! Collaborators are injected behind traits:
//!
//! * [`backend::RecordingBackend`]: fire-and-forget commands to the
//!   external recording service; truth only ever arrives back as events.
//! * [`playback::AudioPlayer`]: open/start/release of the recorded
//!   artifact; emits one completion event per playthrough.
//!
//! The rendered tile face ([`tile::TileView`]) is published through a
//! `watch` channel for whatever presentation layer hosts the tile.

pub mod backend;
pub mod config;
pub mod playback;
pub mod tile;
pub mod timer;

pub use backend::{AudioArtifact, QueryResponse, RecordingBackend, StatusEvent};
pub use config::{ConfigUpdate, SamplingRate, TileConfig};
pub use tile::{RecordingState, TileController, TileEvent, TileIcon, TileView};
