//! Rack settings stored as TOML.

use std::path::Path;

use patchbay_core::{DEFAULT_BLOCK_SIZE, DEFAULT_SAMPLE_RATE, Rack};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::validation::{self, ValidationResult, validate_block_size, validate_sample_rate};

/// Sample rate and block size a [`Rack`] is created with.
///
/// Missing keys fall back to 44100 Hz and 64 samples, so an empty file is a
/// valid configuration.
///
/// ```toml
/// sample_rate = 48000
/// block_size = 128
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RackConfig {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Samples per block, also the length of the silence block undelivered
    /// inputs read.
    pub block_size: usize,
}

impl Default for RackConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl RackConfig {
    /// A configuration with the given values. Not validated.
    pub fn new(sample_rate: f32, block_size: usize) -> Self {
        Self {
            sample_rate,
            block_size,
        }
    }

    /// Load and validate a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: RackConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to a TOML file, creating missing parent
    /// directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every field, reporting all problems together.
    pub fn validate(&self) -> ValidationResult<()> {
        let errors = [
            validate_sample_rate(self.sample_rate),
            validate_block_size(self.block_size),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();
        validation::collect(errors)
    }

    /// Validate and build an empty rack with these settings.
    pub fn build_rack(&self) -> Result<Rack, ConfigError> {
        self.validate()?;
        Ok(Rack::new(self.sample_rate, self.block_size))
    }

    /// Blocks per second.
    pub fn block_rate(&self) -> f32 {
        self.sample_rate / self.block_size as f32
    }

    /// Duration of one block in milliseconds, the lowest latency a rack with
    /// these settings can achieve.
    pub fn min_latency_ms(&self) -> f32 {
        self.block_size as f32 / self.sample_rate * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;

    #[test]
    fn defaults_match_rack_defaults() {
        let config = RackConfig::default();
        assert_eq!(config.sample_rate, 44100.0);
        assert_eq!(config.block_size, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_and_partial_toml_use_defaults() {
        assert_eq!(RackConfig::from_toml_str("").unwrap(), RackConfig::default());

        let config = RackConfig::from_toml_str("block_size = 256").unwrap();
        assert_eq!(config, RackConfig::new(44100.0, 256));
    }

    #[test]
    fn integer_sample_rate_parses() {
        let config = RackConfig::from_toml_str("sample_rate = 48000\nblock_size = 32").unwrap();
        assert_eq!(config, RackConfig::new(48000.0, 32));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = RackConfig::from_toml_str("block_size = 0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ValidationError::ZeroBlockSize)
        ));

        let err = RackConfig::from_toml_str("sample_rate = -1.0\nblock_size = 0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ValidationError::Multiple(ref errors)) if errors.len() == 2
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = RackConfig::from_toml_str("block_size = \"large\"").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn toml_text_round_trips() {
        let config = RackConfig::new(96000.0, 512);
        let text = config.to_toml().unwrap();
        assert!(text.contains("block_size = 512"), "got: {text}");
        assert_eq!(RackConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn build_rack_applies_settings() {
        let rack = RackConfig::new(22050.0, 16).build_rack().unwrap();
        assert_eq!(rack.sample_rate(), 22050.0);
        assert_eq!(rack.block_size(), 16);
        assert_eq!(rack.device_count(), 0);

        assert!(RackConfig::new(f32::NAN, 16).build_rack().is_err());
    }

    #[test]
    fn timing() {
        let config = RackConfig::new(48000.0, 480);
        assert!((config.block_rate() - 100.0).abs() < 1e-4);
        assert!((config.min_latency_ms() - 10.0).abs() < 1e-4);
    }
}
