//! Configuration for the quantmap tool
//!
//! Binning, inversion and worker settings, loaded from TOML (or JSON)
//! and overridable from the command line.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tool-wide configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantmapConfig {
    /// How sample columns are binned
    pub partition: PartitionConfig,
    /// Inverse CDF table settings
    pub inversion: InversionConfig,
    /// Parallel remapping settings
    pub workers: WorkerConfig,
}

/// Binning configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionConfig {
    /// Number of histogram bins per column
    pub bins: usize,
    /// Added past the largest sample so it falls inside the last bin
    pub end_epsilon: f64,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            bins: 256,
            end_epsilon: 1e-9,
        }
    }
}

/// Inverse CDF configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InversionConfig {
    /// Rows in the inverse look-up table
    pub lut_size: usize,
}

impl Default for InversionConfig {
    fn default() -> Self {
        Self { lut_size: 4096 }
    }
}

/// Worker pool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Remapping threads
    pub threads: usize,
    /// Points handed to a worker at a time
    pub chunk_size: usize,
    /// Idle wait per queue poll, in milliseconds
    pub wait_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            threads: 4,
            chunk_size: 1024,
            wait_ms: 10,
        }
    }
}

impl QuantmapConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and validate a configuration file
    ///
    /// `.json` files are parsed as JSON, anything else as TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&text)?,
            _ => Self::from_toml(&text)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.partition.bins == 0 {
            return Err(ConfigError::OutOfRange("partition.bins must be positive".to_string()));
        }

        let eps = self.partition.end_epsilon;
        if !eps.is_finite() || eps < 0.0 {
            return Err(ConfigError::OutOfRange(
                "partition.end_epsilon must be a finite, non-negative number".to_string(),
            ));
        }

        if self.inversion.lut_size == 0 {
            return Err(ConfigError::OutOfRange(
                "inversion.lut_size must be positive".to_string(),
            ));
        }

        if self.workers.threads == 0 {
            return Err(ConfigError::OutOfRange("workers.threads must be positive".to_string()));
        }

        if self.workers.chunk_size == 0 {
            return Err(ConfigError::OutOfRange(
                "workers.chunk_size must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Value out of range: {0}")]
    OutOfRange(String),
}
