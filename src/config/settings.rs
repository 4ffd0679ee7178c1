//! Tile settings, defaults, partial updates and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// SamplingRate
// ---------------------------------------------------------------------------

/// Recording quality, expressed as the sampling rate requested from the
/// recording backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SamplingRate {
    /// 8 kHz: voice-note quality, smallest files.
    Low,
    /// 22.05 kHz: the backend's default rate.
    Medium,
    /// 44.1 kHz: CD-rate capture.
    High,
}

impl SamplingRate {
    /// The rate in hertz as sent on the start-recording command.
    pub fn hertz(self) -> u32 {
        match self {
            SamplingRate::Low => 8_000,
            SamplingRate::Medium => 22_050,
            SamplingRate::High => 44_100,
        }
    }
}

impl Default for SamplingRate {
    fn default() -> Self {
        Self::Medium
    }
}

// ---------------------------------------------------------------------------
// TileConfig
// ---------------------------------------------------------------------------

/// Configuration consumed by the tile controller, serialised as
/// `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use quick_record::config::TileConfig;
///
/// // Load (returns Default when file is missing)
/// let config = TileConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileConfig {
    /// Recording quality passed to the backend on every start command.
    pub quality: SamplingRate,
    /// Auto-stop timeout for unattended recordings, in seconds.
    /// `0` disables the timer.
    pub auto_stop_secs: u64,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            quality: SamplingRate::default(),
            // One hour, matching the backend's default auto-stop.
            auto_stop_secs: 3_600,
        }
    }
}

impl TileConfig {
    /// The auto-stop delay, or `None` when the timer is disabled.
    pub fn auto_stop_delay(&self) -> Option<Duration> {
        (self.auto_stop_secs > 0).then(|| Duration::from_secs(self.auto_stop_secs))
    }

    /// Apply a partial update pushed from the settings surface.
    /// Absent fields leave the current values unchanged.
    pub fn apply(&mut self, update: ConfigUpdate) {
        if let Some(quality) = update.quality {
            self.quality = quality;
        }
        if let Some(hours) = update.auto_stop_hours {
            self.auto_stop_secs = u64::from(hours) * 3_600;
        }
    }

    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(TileConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ConfigUpdate
// ---------------------------------------------------------------------------

/// Partial configuration update pushed to a running controller.
///
/// Mirrors the settings-changed notification: only the fields the user
/// touched are present. The auto-stop duration arrives in whole hours,
/// `Some(0)` disables the timer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigUpdate {
    pub quality: Option<SamplingRate>,
    pub auto_stop_hours: Option<u32>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
