// SPDX-License-Identifier: MIT OR Apache-2.0
//! Application settings.
//!
//! Settings live in a RON file next to the working directory by default:
//! - Window title and size
//! - Dataset path and starting transformation
//! - Dataset hot reload
//! - Log filter and layout spacing

use craftflow_graph::LayoutSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default settings file name
pub const SETTINGS_FILE_NAME: &str = "craftflow.ron";

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Reading or writing the file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File contents are not valid settings
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Settings could not be serialized
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] ron::Error),
}

/// Main window settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    /// Window title
    pub title: String,
    /// Initial inner width in logical pixels
    pub width: u32,
    /// Initial inner height in logical pixels
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Craftflow".to_string(),
            width: 1280,
            height: 800,
        }
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Main window
    pub window: WindowSettings,
    /// Dataset JSON file. The embedded demo is used when unset.
    pub dataset: Option<PathBuf>,
    /// Transformation shown on reset, overriding the dataset default
    pub default_transformation: Option<String>,
    /// Reload the dataset when its file changes
    pub watch_dataset: bool,
    /// Extra tracing directives, e.g. `"craftflow_graph=debug"`
    pub log_filter: Option<String>,
    /// Node spacing
    pub layout: LayoutSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            window: WindowSettings::default(),
            dataset: None,
            default_transformation: None,
            watch_dataset: true,
            log_filter: None,
            layout: LayoutSettings::default(),
        }
    }
}

impl AppSettings {
    /// Load settings, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Ok(ron::from_str(&content)?)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        let content = ron::ser::to_string_pretty(self, config)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Dataset path resolved against the settings file's directory
    pub fn dataset_path(&self, settings_path: &Path) -> Option<PathBuf> {
        let dataset = self.dataset.as_ref()?;
        if dataset.is_absolute() {
            return Some(dataset.clone());
        }
        let base = settings_path.parent().unwrap_or_else(|| Path::new(""));
        Some(base.join(dataset))
    }
}
