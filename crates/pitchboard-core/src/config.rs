//! Editor configuration.

use crate::shapes::SerializableColor;
use crate::tools::LineFinishPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Tunables for an editor instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub line_finish_policy: LineFinishPolicy,
    pub brush_color: SerializableColor,
    pub brush_width: f64,
    /// Stroke colour for lines and arrows.
    pub annotation_color: SerializableColor,
    /// Density of the saved preview image.
    pub raster_pixel_ratio: f64,
    pub hit_tolerance: f64,
    pub default_text: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            line_finish_policy: LineFinishPolicy::default(),
            brush_color: SerializableColor::white(),
            brush_width: 3.0,
            annotation_color: SerializableColor::rgb(0xff, 0xd6, 0x0a),
            raster_pixel_ratio: 2.0,
            hit_tolerance: 4.0,
            default_text: "Text".to_string(),
        }
    }
}

impl EditorConfig {
    /// Load from a JSON file. A missing file gives the defaults.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EditorConfig::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r##"{"line_finish_policy":"ReturnToSelect","brush_color":"#000000"}"##,
        )
        .unwrap();
        let config = EditorConfig::load(&path).unwrap();
        assert_eq!(config.line_finish_policy, LineFinishPolicy::ReturnToSelect);
        assert_eq!(config.brush_color, SerializableColor::black());
        assert_eq!(config.brush_width, 3.0);
        assert_eq!(config.default_text, "Text");
    }

    #[test]
    fn test_bad_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(EditorConfig::load(&path), Err(ConfigError::Parse { .. })));
    }
}
