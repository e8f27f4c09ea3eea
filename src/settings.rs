//! Runtime settings
//!
//! Loaded from a JSON file in the data directory; missing fields take their
//! defaults. A couple of environment variables override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::{POLL_MILLIS, RESUME_GRACE_MILLIS, TICK_MILLIS};

/// Default match server endpoint
pub const DEFAULT_SERVER_URL: &str = "http://mathuzzles.appspot.com/MultiPlay";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Timing ===
    /// Minimum time between board ticks
    pub tick_millis: u64,
    /// Minimum time between peer polls
    pub poll_millis: u64,
    /// Clock offset applied when unpausing
    pub resume_grace_millis: u64,

    // === Two-player ===
    /// Match server endpoint; the query string is appended as-is
    pub server_url: String,
    /// Give up on a poll after this long
    pub request_timeout_secs: u64,

    // === Storage ===
    /// Where saved games and the high score live
    pub data_dir: PathBuf,

    /// Fixed RNG seed (random when unset)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_millis: TICK_MILLIS,
            poll_millis: POLL_MILLIS,
            resume_grace_millis: RESUME_GRACE_MILLIS,

            server_url: DEFAULT_SERVER_URL.to_string(),
            request_timeout_secs: 10,

            data_dir: PathBuf::from(".rising_numbers"),

            seed: None,
        }
    }
}

impl Settings {
    /// File name looked up in the data directory
    pub const FILE_NAME: &'static str = "rising_numbers_settings.json";

    pub const ENV_SERVER_URL: &'static str = "RISING_NUMBERS_SERVER_URL";
    pub const ENV_DATA_DIR: &'static str = "RISING_NUMBERS_DATA_DIR";

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }

    pub fn poll_period(&self) -> Duration {
        Duration::from_millis(self.poll_millis)
    }

    pub fn resume_grace(&self) -> Duration {
        Duration::from_millis(self.resume_grace_millis)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parse settings JSON; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load from `<data_dir>/rising_numbers_settings.json`, then apply
    /// environment overrides. Falls back to defaults if the file is missing
    /// or invalid.
    pub fn load() -> Self {
        let data_dir = std::env::var_os(Self::ENV_DATA_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| Self::default().data_dir);

        let mut settings = Self::load_file(&data_dir.join(Self::FILE_NAME));
        settings.data_dir = data_dir;
        if let Ok(url) = std::env::var(Self::ENV_SERVER_URL) {
            settings.server_url = url;
        }
        settings
    }

    fn load_file(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring invalid settings file {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }
}
