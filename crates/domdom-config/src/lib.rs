//! Configuration loading.
//!
//! An optional `config.toml` in the platform config directory. Every field
//! has a default, and any load failure (missing directory, missing file,
//! unparsable contents) falls back to `Config::default()` so the app always
//! starts.

use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Target frame rate of the render loop.
    pub fps: u16,
    /// Capture mouse events and feed them to the running effect.
    pub mouse: bool,
    /// Fixed starting effect; unset means a random seasonal pick.
    pub effect: Option<String>,
    /// Start with effects enabled.
    pub enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fps: 60,
            mouse: true,
            effect: None,
            enabled: true,
        }
    }
}

impl Config {
    /// Load from the platform config directory, degrading to defaults.
    pub fn load() -> Self {
        config_path()
            .and_then(|path| fs::read_to_string(path).ok())
            .and_then(|text| toml::from_str(&text).ok())
            .unwrap_or_default()
    }

    pub fn frame_ms(&self) -> u64 {
        1000 / u64::from(self.fps.max(1))
    }
}

fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "domdom").map(|dirs| dirs.config_dir().join("config.toml"))
}
