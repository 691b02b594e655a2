//! Patchbay Devices - leaf devices for patchbay racks
//!
//! Every device here is a [`Process`](patchbay_core::Process) implementation
//! plus an `add` constructor that places it in a rack and returns a typed
//! handle ([`Mono`], [`Source`] or [`Sink`]):
//!
//! - [`SilenceSource`], [`DcSource`], [`NoiseSource`] - Signal generators
//! - [`Gain`], [`LinearGain`], [`Inverter`] - Gain stages
//! - [`ClipDistortion`] - Hard clipping at a dBFS threshold
//! - [`Printer`] - Writes blocks to a writer and forwards them
//! - [`Recorder`] - Captures blocks into a bounded [`Tape`]
//! - [`Mixer`] - Saturating sum of several inputs
//! - [`stereo`] - Left/right composite of any mono device
//!
//! ## Example
//!
//! ```rust
//! use patchbay_core::Rack;
//! use patchbay_devices::{ClipDistortion, Gain, LINEAR_MAX, NoiseSource, Recorder};
//!
//! let mut rack = Rack::new(44100.0, 64);
//! let noise = NoiseSource::add(&mut rack, "noise", LINEAR_MAX, 1)?;
//! let gain = Gain::add(&mut rack, "gain", -6.02)?;
//! let clip = ClipDistortion::add(&mut rack, "clip", -12.0)?;
//! let (rec, tape) = Recorder::add(&mut rack, "rec", 128)?;
//!
//! rack.patch(noise.device, gain.device)?;
//! rack.patch(gain.device, clip.device)?;
//! rack.patch(clip.device, rec.device)?;
//!
//! let root = rack.tick_root(rec.device)?;
//! rack.tick(root)?;
//! rack.tick(root)?;
//! assert!(tape.full());
//! # Ok::<(), patchbay_core::GraphError>(())
//! ```

pub mod clip;
pub mod db;
pub mod gain;
pub mod handle;
pub mod mixer;
pub mod players;
pub mod sources;
pub mod stereo;

// Re-export main types at crate root
pub use clip::ClipDistortion;
pub use db::{LINEAR_MAX, db_to_linear, dbfs_to_linear, linear_to_db, linear_to_dbfs};
pub use gain::{Gain, Inverter, LinearGain};
pub use handle::{Handle, Mono, Sink, Source};
pub use mixer::Mixer;
pub use players::{Printer, Recorder, Tape};
pub use sources::{DcSource, NoiseSource, SilenceSource};
pub use stereo::{Stereo, stereo};
