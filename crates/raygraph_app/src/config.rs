// SPDX-License-Identifier: MIT OR Apache-2.0
//! Viewer settings and configuration.
//!
//! Settings live in a RON file next to the executable. They name the graph
//! files to load (`{base_path}/{file_name}.txt`), which of them drives the
//! camera framing, and the interactive speeds.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Default settings file name
pub const SETTINGS_FILE_NAME: &str = "raygraph.ron";

/// Errors loading or saving settings
#[derive(Debug, Error)]
pub enum SettingsError {
    /// File could not be read or written
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File contents were not valid RON
    #[error("failed to parse settings: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Settings could not be serialized
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] ron::Error),
}

/// One graph file to load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSlot {
    /// File name without the `.txt` extension
    pub file_name: String,
    /// Whether this graph drives camera framing after load
    pub primary: bool,
}

/// Persistent viewer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerSettings {
    /// Settings format version
    pub version: u32,
    /// Directory containing the graph files
    pub base_path: PathBuf,
    /// Graphs to load, in load order
    pub graphs: Vec<GraphSlot>,
    /// Render vertex markers as simple crosses instead of wire cubes
    pub use_simple_meshes: bool,
    /// Initial window width
    pub window_width: u32,
    /// Initial window height
    pub window_height: u32,
    /// Camera movement speed, units per second
    pub move_speed: f32,
    /// Arrow-key turn speed, degrees per second
    pub turn_speed: f32,
    /// Mouse-drag turn speed, degrees per pixel-second
    pub mouse_turn_speed: f32,
    /// Scroll vertical-movement speed
    pub scroll_speed: f32,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            base_path: PathBuf::from("graphs"),
            graphs: vec![GraphSlot { file_name: "graph".to_owned(), primary: true }],
            use_simple_meshes: false,
            window_width: 1600,
            window_height: 900,
            move_speed: 10.0,
            turn_speed: 90.0,
            mouse_turn_speed: 10.0,
            scroll_speed: 10.0,
        }
    }
}

impl ViewerSettings {
    /// Full path of a graph slot's file
    pub fn graph_file_path(&self, slot: &GraphSlot) -> PathBuf {
        self.base_path.join(format!("{}.txt", slot.file_name))
    }

    /// Index of the slot flagged primary, if any
    pub fn primary_index(&self) -> Option<usize> {
        self.graphs.iter().position(|slot| slot.primary)
    }

    /// Load settings from a RON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path)?;
        let settings: Self = ron::from_str(&contents)?;
        Ok(settings)
    }

    /// Save settings to a RON file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let contents = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Load settings, falling back to defaults when the file is absent or
    /// malformed. A missing file is written out with the defaults so the
    /// user has something to edit.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => {
                tracing::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                tracing::warn!("Using default settings ({e})");
                let settings = Self::default();
                if !path.exists() {
                    if let Err(e) = settings.save(path) {
                        tracing::warn!("Could not write default settings: {e}");
                    }
                }
                settings
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = ViewerSettings::default();
        assert_eq!(settings.version, SETTINGS_FORMAT_VERSION);
        assert_eq!(settings.primary_index(), Some(0));
    }

    #[test]
    fn test_serialization_round_trip() {
        let settings = ViewerSettings::default();
        let ron_str =
            ron::ser::to_string_pretty(&settings, ron::ser::PrettyConfig::default()).unwrap();
        let loaded: ViewerSettings = ron::from_str(&ron_str).unwrap();
        assert_eq!(loaded.graphs.len(), settings.graphs.len());
        assert_eq!(loaded.base_path, settings.base_path);
    }

    #[test]
    fn test_graph_file_path_convention() {
        let mut settings = ViewerSettings::default();
        settings.base_path = PathBuf::from("/data/runs");
        let slot = GraphSlot { file_name: "run42".to_owned(), primary: true };
        assert_eq!(
            settings.graph_file_path(&slot),
            PathBuf::from("/data/runs/run42.txt")
        );
    }
}
