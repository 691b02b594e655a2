//! Shared CLI helpers used across multiple commands.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use patchbay_config::RackConfig;
use patchbay_devices::LINEAR_MAX;

use crate::chain::DemoSettings;

/// Options describing the demo chain, shared by `demo` and `tree`.
#[derive(Args, Debug, Clone)]
pub struct ChainArgs {
    /// Rack configuration file (TOML with `sample_rate` and `block_size`)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Peak level of the noise source
    #[arg(long, default_value_t = LINEAR_MAX)]
    pub level: i32,

    /// Noise source seed
    #[arg(long, default_value_t = 0x1234_5678)]
    pub seed: u32,

    /// Gain stage in dB
    #[arg(long, default_value_t = -6.02, allow_negative_numbers = true)]
    pub gain_db: f64,

    /// Clipping threshold in dBFS
    #[arg(long, default_value_t = -12.0, allow_negative_numbers = true)]
    pub clip_dbfs: f64,
}

impl ChainArgs {
    /// Demo settings with printers bypassed or not.
    pub fn settings(&self, quiet: bool) -> DemoSettings {
        DemoSettings {
            level: self.level,
            seed: self.seed,
            gain_db: self.gain_db,
            clip_dbfs: self.clip_dbfs,
            bypass_printers: quiet,
        }
    }
}

/// Load the rack configuration from `path`, or the defaults without one.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<RackConfig> {
    match path {
        Some(path) => RackConfig::load(path)
            .with_context(|| format!("loading rack configuration from {}", path.display())),
        None => Ok(RackConfig::default()),
    }
}
