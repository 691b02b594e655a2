//! Configuration for patchbay racks.
//!
//! A [`RackConfig`] holds the sample rate and block size a
//! [`Rack`](patchbay_core::Rack) is created with. It is read from and written
//! to TOML, validated before use, and turned into an empty rack with
//! [`RackConfig::build_rack`].
//!
//! # Example
//!
//! ```rust
//! use patchbay_config::RackConfig;
//!
//! let config = RackConfig::from_toml_str("sample_rate = 48000\nblock_size = 128")?;
//! let rack = config.build_rack()?;
//! assert_eq!(rack.block_size(), 128);
//! assert_eq!(config.block_rate(), 375.0);
//! # Ok::<(), patchbay_config::ConfigError>(())
//! ```

mod error;
mod rack_config;

/// Rack configuration validation.
pub mod validation;

pub use error::ConfigError;
pub use rack_config::RackConfig;
pub use validation::{ValidationError, ValidationResult, validate_block_size, validate_sample_rate};
