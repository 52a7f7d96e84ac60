// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! Settings are read from `<config_dir>/barcode-scanner/config.json` when the
//! file exists. The scanner never writes the file.

use crate::constants::{app_info, capture};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Camera device path to prefer over the first enumerated one
    pub camera_path: Option<String>,
    /// Requested capture width
    pub capture_width: u32,
    /// Requested capture height
    pub capture_height: u32,
    /// Requested frame rate
    pub framerate: u32,
    /// Frames larger than this are downscaled before detection (0 = never)
    pub detection_max_dimension: u32,
    /// Metadata batches buffered between capture thread and UI context
    pub metadata_queue_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            camera_path: None,
            capture_width: capture::DEFAULT_WIDTH,
            capture_height: capture::DEFAULT_HEIGHT,
            framerate: capture::DEFAULT_FRAMERATE,
            detection_max_dimension: capture::DEFAULT_DETECTION_MAX_DIMENSION,
            metadata_queue_depth: capture::DEFAULT_METADATA_QUEUE_DEPTH,
        }
    }
}

impl Config {
    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| {
            dir.join(app_info::CONFIG_DIR_NAME)
                .join(app_info::CONFIG_FILE_NAME)
        })
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> AppResult<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("No configuration directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from a specific file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json(&content).map_err(|e| {
            AppError::Config(format!("{}: {}", path.display(), e))
        })?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse configuration JSON; absent fields keep their defaults
    pub fn from_json(content: &str) -> AppResult<Self> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if self.capture_width == 0 || self.capture_height == 0 {
            return Err(AppError::Config(
                "capture size must be non-zero".to_string(),
            ));
        }
        if self.framerate == 0 {
            return Err(AppError::Config("framerate must be non-zero".to_string()));
        }
        if !(1..=capture::MAX_METADATA_QUEUE_DEPTH).contains(&self.metadata_queue_depth) {
            return Err(AppError::Config(format!(
                "metadata_queue_depth must be between 1 and {}",
                capture::MAX_METADATA_QUEUE_DEPTH
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json(r#"{ "camera_path": "/dev/video2" }"#).unwrap();
        assert_eq!(config.camera_path.as_deref(), Some("/dev/video2"));
        assert_eq!(config.capture_width, capture::DEFAULT_WIDTH);
        assert_eq!(config.framerate, capture::DEFAULT_FRAMERATE);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Config::from_json(r#"{ "framerate": 0 }"#).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let err = Config::from_json(r#"{ "metadata_queue_depth": 100000 }"#).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = Config::from_json("{ not json").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
