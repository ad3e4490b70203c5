//! Where `speech-emotion` keeps its settings and classifier weights.
//!
//! ```text
//! <config dir>/speech-emotion/settings.toml
//! <data dir>/speech-emotion/models/ser.safetensors
//! ```
//!
//! `<config dir>` and `<data dir>` come from [`dirs::config_dir`] and
//! [`dirs::data_local_dir`] (`~/.config` and `~/.local/share` on Linux,
//! `%APPDATA%` and `%LOCALAPPDATA%` on Windows, `~/Library/Application
//! Support` for both on macOS).

use std::path::PathBuf;

const APP_NAME: &str = "speech-emotion";
const SETTINGS_FILE: &str = "settings.toml";
const MODELS_DIR: &str = "models";

/// Resolved locations of the settings file and the weights directory.
#[derive(Debug, Clone, PartialEq)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    /// `config_dir/settings.toml`, read by [`AppConfig::load`](super::AppConfig::load).
    pub settings_file: PathBuf,
    /// Searched for the default weights file when `model.weights_file` is unset.
    pub models_dir: PathBuf,
}

impl AppPaths {
    /// Platform directories, or the working directory where the platform
    /// has none.
    pub fn new() -> Self {
        let base = |dir: Option<PathBuf>| dir.unwrap_or_else(|| PathBuf::from(".")).join(APP_NAME);
        let config_dir = base(dirs::config_dir());
        Self {
            settings_file: config_dir.join(SETTINGS_FILE),
            models_dir: base(dirs::data_local_dir()).join(MODELS_DIR),
            config_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
