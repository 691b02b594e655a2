//! Decibel conversions for integer samples.
//!
//! Gains are expressed in dB (`20 * log10(gain)`); levels in dBFS, relative to
//! [`LINEAR_MAX`], the largest representable sample.

use patchbay_core::Sample;

/// Largest sample value, 0 dBFS.
pub const LINEAR_MAX: Sample = Sample::MAX;

/// Convert decibels to a linear gain factor.
///
/// ```rust
/// use patchbay_devices::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 1e-12);
/// assert!((db_to_linear(20.0) - 10.0).abs() < 1e-9);
/// ```
pub fn db_to_linear(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}

/// Convert a linear gain factor to decibels.
///
/// Non-positive gains map to negative infinity.
pub fn linear_to_db(gain: f64) -> f64 {
    20.0 * gain.log10()
}

/// Convert a dBFS level to a linear sample magnitude.
pub fn dbfs_to_linear(dbfs: f64) -> f64 {
    f64::from(LINEAR_MAX) * db_to_linear(dbfs)
}

/// Convert a sample magnitude to dBFS. The sign of `value` is ignored.
pub fn linear_to_dbfs(value: f64) -> f64 {
    linear_to_db(value.abs() / f64::from(LINEAR_MAX))
}
