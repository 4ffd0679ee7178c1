//! Platform-appropriate file locations, resolved through the `dirs` crate.
//!
//! Settings live under the per-user config directory
//! (`~/.config/quick-record/` on Linux), recorded clips under the local
//! data directory (`~/.local/share/quick-record/recordings/`). Only the
//! demo binary touches either; the tile controller never reads disk.

use std::path::PathBuf;

const APP_NAME: &str = "quick-record";

/// Resolved locations for settings and recorded clips.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory holding `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Where the demo binary points the simulated recorder.
    pub recordings_dir: PathBuf,
}

impl AppPaths {
    /// Resolve every path. A platform without standard directories falls
    /// back to the current working directory.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_NAME);
        let recordings_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_NAME)
            .join("recordings");

        Self {
            settings_file: config_dir.join("settings.toml"),
            config_dir,
            recordings_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_file_lives_inside_the_config_dir() {
        let paths = AppPaths::new();
        assert!(paths.settings_file.starts_with(&paths.config_dir));
        assert_eq!(
            paths.settings_file.file_name().and_then(|n| n.to_str()),
            Some("settings.toml")
        );
    }

    #[test]
    fn recordings_dir_is_namespaced_under_the_app() {
        let paths = AppPaths::new();
        assert!(paths
            .recordings_dir
            .iter()
            .any(|part| part == "quick-record"));
    }
}
