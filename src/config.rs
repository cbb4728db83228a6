//! Configuration file format.
//!
//! Every section is optional; missing keys fall back to defaults.
//!
//! ```toml
//! [capture]
//! device_id = 0
//! width = 640
//! height = 480
//!
//! [detection]
//! confidence_threshold = 0.7
//! entropy_class = 0
//!
//! [sampling]
//! algorithm = "sha256"
//! ```

use crate::capture::{CaptureConfig, ConfigError};
use crate::conditioning::HashAlgorithm;
use crate::detection::DetectorConfig;
use crate::features::FeatureConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub detection: DetectorConfig,
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Sampling configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Hash used to fold blobs into digests.
    pub algorithm: HashAlgorithm,
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Print a summary of each accepted blob.
    pub show_blobs: bool,
    /// Metrics server port (0 to disable).
    pub metrics_port: u16,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            show_blobs: true,
            metrics_port: 0,
        }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.capture.validate()?;
        self.detection.validate()?;
        self.features.validate()
    }
}
