//! Settings file for the controller and compositor.
//!
//! Stored as pretty-printed JSON. Missing fields fall back to defaults, so a
//! file containing only `{}` is valid.

use crate::layer::LayerMask;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or saving settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    /// Translation speed in units per second.
    pub speed: f32,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self { speed: 10.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorSettings {
    /// Horizontal scale of the reduced-resolution pass, in (0.1, 1.0].
    pub width_scale_factor: f32,
    /// Vertical scale of the reduced-resolution pass, in (0.1, 1.0].
    pub height_scale_factor: f32,
    /// Layers rendered at reduced resolution.
    pub layer_mask: LayerMask,
}

impl Default for CompositorSettings {
    fn default() -> Self {
        Self {
            width_scale_factor: 1.0,
            height_scale_factor: 1.0,
            layer_mask: LayerMask::ALL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub controller: ControllerSettings,
    pub compositor: CompositorSettings,
}

impl Settings {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let settings: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        serde_json::to_writer_pretty(std::fs::File::create(path)?, self)?;
        tracing::debug!(path = %path.display(), "saved settings");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let s = Settings::from_json_str("{}").unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.controller.speed, 10.0);
        assert_eq!(s.compositor.layer_mask, LayerMask::ALL);
    }

    #[test]
    fn partial_compositor_section() {
        let s = Settings::from_json_str(
            r#"{ "compositor": { "width_scale_factor": 0.5, "layer_mask": 6 } }"#,
        )
        .unwrap();
        assert_eq!(s.compositor.width_scale_factor, 0.5);
        assert_eq!(s.compositor.height_scale_factor, 1.0);
        assert_eq!(s.compositor.layer_mask, LayerMask(6));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = Settings::from_json_str("{ speed").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut settings = Settings::default();
        settings.controller.speed = 4.5;
        settings.compositor.height_scale_factor = 0.25;
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
