// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor settings.
//!
//! Settings live in a RON file next to the flows being edited:
//! - Canvas grid (cell size, snapping)
//! - Validation strictness
//! - Status message timings
//! - Save output format

use chatflow_graph::{ValidationMode, DEFAULT_GRID_SIZE};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default settings file name
pub const SETTINGS_FILE_NAME: &str = "chatflow.ron";

/// Encoding used when a flow is written out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SaveFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// Pretty-printed RON
    Ron,
}

impl SaveFormat {
    /// Pick a format from a file extension, defaulting to JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("ron") => SaveFormat::Ron,
            _ => SaveFormat::Json,
        }
    }
}

/// How long status messages stay visible, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusTimings {
    /// Flow validated and saved
    pub success_ms: u64,
    /// Flow failed validation or could not be saved
    pub failure_ms: u64,
    /// Connection created or refused as a duplicate
    pub connection_ms: u64,
    /// Drawing refused because the node already has its outgoing edge
    pub rejection_ms: u64,
}

impl Default for StatusTimings {
    fn default() -> Self {
        Self {
            success_ms: 3000,
            failure_ms: 5000,
            connection_ms: 2000,
            rejection_ms: 3000,
        }
    }
}

impl StatusTimings {
    /// Delay for a successful save
    pub fn success(&self) -> Duration {
        Duration::from_millis(self.success_ms)
    }

    /// Delay for a failed save
    pub fn failure(&self) -> Duration {
        Duration::from_millis(self.failure_ms)
    }

    /// Delay for connection feedback
    pub fn connection(&self) -> Duration {
        Duration::from_millis(self.connection_ms)
    }

    /// Delay for a refused drawing gesture
    pub fn rejection(&self) -> Duration {
        Duration::from_millis(self.rejection_ms)
    }
}

/// Editor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Grid cell size in canvas units
    pub grid_size: f32,
    /// Snap dropped and dragged nodes to the grid
    pub snap_to_grid: bool,
    /// Validation strictness
    pub validation_mode: ValidationMode,
    /// Status message timings
    pub status: StatusTimings,
    /// Format used by file sinks
    pub save_format: SaveFormat,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            snap_to_grid: true,
            validation_mode: ValidationMode::Compatible,
            status: StatusTimings::default(),
            save_format: SaveFormat::Json,
        }
    }
}

impl EditorSettings {
    /// Load settings from a RON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path)?;
        let settings: EditorSettings = ron::from_str(&contents)?;
        if !(settings.grid_size.is_finite() && settings.grid_size > 0.0) {
            return Err(SettingsError::InvalidGridSize(settings.grid_size));
        }
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            tracing::debug!("No settings at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let settings = Self::load(path)?;
        tracing::info!("Loaded editor settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to a RON file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let contents = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Error loading or saving settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// File could not be read or written
    #[error("Settings file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// File contents are not valid settings
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Settings could not be encoded
    #[error("Failed to encode settings: {0}")]
    Encode(#[from] ron::Error),

    /// Grid size must be a positive number
    #[error("Grid size must be positive, got {0}")]
    InvalidGridSize(f32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = EditorSettings::default();
        assert_eq!(settings.grid_size, 20.0);
        assert!(settings.snap_to_grid);
        assert_eq!(settings.validation_mode, ValidationMode::Compatible);
        assert_eq!(settings.status.success(), Duration::from_secs(3));
        assert_eq!(settings.status.failure(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: EditorSettings =
            ron::from_str("(validation_mode: Strict, status: (failure_ms: 8000))").unwrap();
        assert_eq!(settings.validation_mode, ValidationMode::Strict);
        assert_eq!(settings.status.failure_ms, 8000);
        assert_eq!(settings.status.success_ms, 3000);
        assert_eq!(settings.grid_size, 20.0);
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("chatflow_settings_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(SETTINGS_FILE_NAME);

        let settings = EditorSettings {
            grid_size: 10.0,
            save_format: SaveFormat::Ron,
            ..EditorSettings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(EditorSettings::load_or_default(&path).unwrap(), settings);

        std::fs::write(&path, "(grid_size: 0.0)").unwrap();
        assert!(matches!(EditorSettings::load(&path), Err(SettingsError::InvalidGridSize(_))));

        std::fs::remove_dir_all(&dir).unwrap();
        assert_eq!(EditorSettings::load_or_default(&path).unwrap(), EditorSettings::default());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(SaveFormat::from_path(Path::new("flow.ron")), SaveFormat::Ron);
        assert_eq!(SaveFormat::from_path(Path::new("flow.RON")), SaveFormat::Ron);
        assert_eq!(SaveFormat::from_path(Path::new("flow.json")), SaveFormat::Json);
        assert_eq!(SaveFormat::from_path(Path::new("flow")), SaveFormat::Json);
    }
}
