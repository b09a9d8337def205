use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::detection::domain::detector_options::DetectorOptions;
use crate::shared::camera_selector::CameraSelector;
use crate::shared::constants::{
    DEFAULT_CAPTURE_HEIGHT, DEFAULT_CAPTURE_INTERVAL_MS, DEFAULT_CAPTURE_WIDTH,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Pipeline settings. Fixed once the controller is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub capture_interval_ms: u64,
    pub capture_width: u32,
    pub capture_height: u32,
    pub initial_camera: CameraSelector,
    pub detector: DetectorOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            capture_interval_ms: DEFAULT_CAPTURE_INTERVAL_MS,
            capture_width: DEFAULT_CAPTURE_WIDTH,
            capture_height: DEFAULT_CAPTURE_HEIGHT,
            initial_camera: CameraSelector::default(),
            detector: DetectorOptions::default(),
        }
    }
}

impl PipelineConfig {
    pub fn capture_interval(&self) -> Duration {
        Duration::from_millis(self.capture_interval_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capture_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "capture_interval_ms must be greater than 0".into(),
            ));
        }
        if self.capture_width == 0 || self.capture_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "capture resolution must be non-zero, got {}x{}",
                self.capture_width, self.capture_height
            )));
        }
        Ok(())
    }

    /// Parses and validates a JSON config. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::detector_options::PerformanceMode;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.capture_interval(), Duration::from_millis(5000));
        assert_eq!((config.capture_width, config.capture_height), (640, 480));
        assert_eq!(config.initial_camera, CameraSelector::Front);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = PipelineConfig::from_json_str(
            r#"{"capture_interval_ms": 250, "initial_camera": "back",
                "detector": {"performance_mode": "fast"}}"#,
        )
        .unwrap();
        assert_eq!(config.capture_interval_ms, 250);
        assert_eq!(config.initial_camera, CameraSelector::Back);
        assert_eq!(config.capture_width, 640);
        assert_eq!(config.detector.performance_mode, PerformanceMode::Fast);
        assert!(config.detector.classifies());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let result = PipelineConfig::from_json_str(r#"{"capture_interval_ms": 0}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let config = PipelineConfig {
            capture_height: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let result = PipelineConfig::from_json_str("[1, 2");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_from_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moodcam.json");
        let config = PipelineConfig {
            capture_interval_ms: 1000,
            initial_camera: CameraSelector::Back,
            ..PipelineConfig::default()
        };
        fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        assert_eq!(PipelineConfig::from_json_file(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = PipelineConfig::from_json_file(Path::new("/nonexistent/moodcam.json"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
