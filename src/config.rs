//! Conditioner configuration.
//!
//! Buffer capacity is fixed when a conditioner is built. Changing it
//! means building a new conditioner; there is no resize path.

use crate::conditioning::BitOrder;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default buffer capacity in bytes.
pub const DEFAULT_CAPACITY: usize = 10;

/// Configuration for the conditioned byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Buffer capacity in bytes.
    pub capacity: usize,
    /// Position of the first corrected bit inside each packed byte.
    pub bit_order: BitOrder,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            bit_order: BitOrder::LsbFirst,
        }
    }
}

impl BufferConfig {
    /// Creates a configuration with the given capacity and default bit order.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::InvalidCapacity);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid buffer capacity (must be at least 1 byte)")]
    InvalidCapacity,
    #[error("invalid probability of a one bit: {0} (must be within 0.0..=1.0)")]
    InvalidProbability(f64),
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub buffer: BufferConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Simulated source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Probability that a raw bit is one (0.5 is unbiased).
    pub probability_one: f64,
    /// Fixed seed for reproducible runs; OS entropy when absent.
    pub seed: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            probability_one: 0.5,
            seed: None,
        }
    }
}

impl SourceConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.probability_one) {
            return Err(ConfigError::InvalidProbability(self.probability_one));
        }
        Ok(())
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Number of full buffers to collect when not continuous.
    pub buffers: u32,
    /// Keep collecting buffers until interrupted.
    pub continuous: bool,
    /// Raw bit budget per buffer before giving up on a stuck source.
    pub max_raw_bits: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            buffers: 1,
            continuous: false,
            max_raw_bits: 1_000_000,
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
        self.buffer.validate()?;
        self.source.validate()
    }
}
