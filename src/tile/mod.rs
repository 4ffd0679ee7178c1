//! The record/playback tile: state machine, event vocabulary, controller
//! and presentation adapter.
//!
//! Everything that can happen to the tile (clicks, backend broadcasts,
//! query replies, timer fires, playback completion, config pushes,
//! lifecycle hooks) is a [`TileEvent`] delivered onto one serial queue.
//! [`TileController::run`] drains that queue, advances the
//! [`RecordingState`] machine, drives the injected backend/player/timer,
//! and publishes a fresh [`TileView`] after every event.

pub mod controller;
pub mod event;
pub mod render;
pub mod state;

pub use controller::{TileController, TileHandle};
pub use event::TileEvent;
pub use render::{render, TileIcon, TileView};
pub use state::RecordingState;
