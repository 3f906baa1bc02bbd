//! Settings management for Lockdown Menu
//!
//! Handles persistent configuration:
//! - Launch on login
//! - In-memory log buffer size

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::PathBuf;

use crate::autostart;

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether to start at login
    pub open_on_startup: bool,

    /// Number of log records kept in memory for support emails
    pub log_buffer_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            open_on_startup: false,
            log_buffer_capacity: 2000,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Could not determine settings path")]
    PathNotAvailable,
}

impl Settings {
    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("Lockdown").join("settings.json"))
    }

    /// Load settings from the default path
    pub fn load() -> Self {
        Self::settings_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Load settings from `path`, falling back to defaults on any problem
    pub fn load_from(path: &std::path::Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!("Ignoring unreadable settings file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read settings file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings to `path`
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), SettingsError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;

        Ok(())
    }
}

/// Read/write access to the launch-on-login preference
pub trait SettingsStore {
    fn open_on_startup(&self) -> bool;
    fn set_open_on_startup(&self, enabled: bool);
}

/// Settings store persisted to a JSON file
///
/// Writing `open_on_startup` also updates the OS login registration.
pub struct FileSettingsStore {
    path: PathBuf,
    settings: RefCell<Settings>,
    register_login_item: bool,
}

impl FileSettingsStore {
    /// Store at the default settings path
    pub fn new() -> Result<Self, SettingsError> {
        let path = Settings::settings_path().ok_or(SettingsError::PathNotAvailable)?;
        Ok(Self::with_path(path))
    }

    /// Store at a custom path
    pub fn with_path(path: PathBuf) -> Self {
        let settings = Settings::load_from(&path);
        Self {
            path,
            settings: RefCell::new(settings),
            register_login_item: true,
        }
    }

    /// Skip touching the OS login registration (used by tests)
    pub fn without_login_item(mut self) -> Self {
        self.register_login_item = false;
        self
    }
}

impl SettingsStore for FileSettingsStore {
    fn open_on_startup(&self) -> bool {
        self.settings.borrow().open_on_startup
    }

    fn set_open_on_startup(&self, enabled: bool) {
        self.settings.borrow_mut().open_on_startup = enabled;

        if let Err(e) = self.settings.borrow().save_to(&self.path) {
            tracing::warn!("Failed to save settings: {}", e);
        }

        if self.register_login_item {
            if let Err(e) = autostart::set_enabled(enabled) {
                tracing::warn!("Failed to update launch at login: {}", e);
            }
        }
    }
}
