//! Viewer configuration loading and export
//!
//! The serialized form is a single flat record keyed by parameter name, the
//! same shape the debug panel copies to the clipboard. It carries no version
//! field; unknown keys are ignored and missing keys take their defaults.

use std::path::Path;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lighting::{LightingConfig, ScenePlacement, ShadowConfig};
use crate::pose::CameraPose;
use crate::presets::SectionPresets;
use crate::scroll::SmoothScrollConfig;
use crate::timeline::{default_transitions, SectionTransition};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse JSON config: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize TOML config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// Every tunable of the viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ConfigRecord", into = "ConfigRecord")]
pub struct ViewerConfig {
    pub lighting: LightingConfig,
    pub shadow: ShadowConfig,
    pub placement: ScenePlacement,
    pub camera: CameraPose,
    pub sections: SectionPresets,
    pub transitions: Vec<SectionTransition>,
    pub smooth_scroll: SmoothScrollConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            lighting: LightingConfig::default(),
            shadow: ShadowConfig::default(),
            placement: ScenePlacement::default(),
            camera: CameraPose::default(),
            sections: SectionPresets::default(),
            transitions: default_transitions(),
            smooth_scroll: SmoothScrollConfig::default(),
        }
    }
}

/// On-disk shape of `ViewerConfig`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ConfigRecord {
    #[serde(flatten)]
    lighting: LightingConfig,
    #[serde(flatten)]
    shadow: ShadowConfig,
    #[serde(flatten)]
    placement: ScenePlacement,
    camera_pos: [f64; 3],
    camera_target: [f64; 3],
    fov: f64,
    /// Derived from position/target; written for reference, ignored on load
    camera_zoom: Option<f64>,
    /// Derived from position/target; written for reference, ignored on load
    camera_rotate: Option<f64>,
    section_cameras: SectionPresets,
    transitions: Vec<SectionTransition>,
    smooth_scroll: SmoothScrollConfig,
}

impl Default for ConfigRecord {
    fn default() -> Self {
        ViewerConfig::default().into()
    }
}

impl From<ViewerConfig> for ConfigRecord {
    fn from(config: ViewerConfig) -> Self {
        let snapshot = config.camera.snapshot();
        Self {
            lighting: config.lighting,
            shadow: config.shadow,
            placement: config.placement,
            camera_pos: snapshot.pos,
            camera_target: snapshot.target,
            fov: snapshot.fov,
            camera_zoom: Some(snapshot.zoom),
            camera_rotate: Some(snapshot.rotate),
            section_cameras: config.sections,
            transitions: config.transitions,
            smooth_scroll: config.smooth_scroll,
        }
    }
}

impl From<ConfigRecord> for ViewerConfig {
    fn from(record: ConfigRecord) -> Self {
        Self {
            lighting: record.lighting,
            shadow: record.shadow,
            placement: record.placement,
            camera: CameraPose::new(
                DVec3::from_array(record.camera_pos),
                DVec3::from_array(record.camera_target),
                record.fov,
            ),
            sections: record.section_cameras,
            transitions: record.transitions,
            smooth_scroll: record.smooth_scroll,
        }
    }
}

impl ViewerConfig {
    /// Parse a JSON export
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pretty JSON, as copied by the debug panel
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load from a file; `.json` files are read as JSON, anything else as TOML
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let config = if is_json {
            Self::from_json(&content)?
        } else {
            Self::from_toml(&content)?
        };
        tracing::info!(path = %path.display(), "Loaded viewer config");
        Ok(config)
    }

    /// Write to a file, choosing the format by extension like `from_file`
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let content = if is_json { self.to_json_pretty()? } else { self.to_toml()? };
        std::fs::write(path, content)?;
        Ok(())
    }
}
