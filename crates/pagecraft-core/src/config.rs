//! Canvas configuration.

use crate::error::ConfigError;
use crate::grid::GridOptions;
use crate::resize::MIN_SIZE;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Version stamped into exported documents.
pub const EXPORT_VERSION: &str = "2.0";

/// Tunables for a canvas. Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Smallest width/height a resize can produce.
    #[serde(default = "default_min_size")]
    pub min_size: f64,
    /// Revert resizes that end overlapping a sibling instead of committing them.
    #[serde(default)]
    pub block_overlapping_resize: bool,
    /// Project name reported in exports. Defaults to the document name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    /// Project version reported in exports.
    #[serde(default = "default_project_version")]
    pub project_version: String,
    /// Export format version.
    #[serde(default = "default_export_version")]
    pub export_version: String,
    /// Initial grid options.
    #[serde(default)]
    pub grid: GridOptions,
}

fn default_min_size() -> f64 {
    MIN_SIZE
}

fn default_project_version() -> String {
    "1.0".to_string()
}

fn default_export_version() -> String {
    EXPORT_VERSION.to_string()
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            min_size: default_min_size(),
            block_overlapping_resize: false,
            project_name: None,
            project_version: default_project_version(),
            export_version: default_export_version(),
            grid: GridOptions::default(),
        }
    }
}

impl CanvasConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded canvas config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_size.is_finite() || self.min_size <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "min_size must be a positive number, got {}",
                self.min_size
            )));
        }
        if !self.grid.size.is_finite() || self.grid.size <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "grid size must be a positive number, got {}",
                self.grid.size
            )));
        }
        Ok(())
    }
}
