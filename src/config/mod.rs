//! Configuration module for quick-record.
//!
//! Provides `TileConfig` (quality + auto-stop settings), the partial
//! `ConfigUpdate` pushed to a running controller, `AppPaths` for
//! cross-platform data directories, and TOML persistence via
//! `TileConfig::load` / `TileConfig::save`.
//!
//! The controller itself never touches durable storage: the binary loads
//! the file once and pushes values in, later changes arrive as
//! [`ConfigUpdate`] events.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{ConfigUpdate, SamplingRate, TileConfig};
