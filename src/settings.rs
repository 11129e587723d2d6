//! Player preferences
//!
//! Only the music volume survives between sessions. Stored as JSON at a path
//! chosen by the host.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Volume used when nothing has been saved yet
pub const DEFAULT_VOLUME: u8 = 30;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed settings: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Music volume in percent, 0-100
    pub volume: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
        }
    }
}

impl Settings {
    /// File name hosts use when they have no better place for it
    pub const FILE_NAME: &'static str = "endless_dash_settings.json";

    pub fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(100);
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.set_volume(settings.volume);
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load from `path`, falling back to defaults on any failure
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(SettingsError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring settings at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        fs::write(path, self.to_json()?)?;
        log::info!("Settings saved");
        Ok(())
    }
}
