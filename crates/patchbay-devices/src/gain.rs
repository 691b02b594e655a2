//! Gain stages.
//!
//! Every stage multiplies each sample by a constant factor in `f64` and
//! converts back with a saturating cast, which truncates toward zero.

use patchbay_core::{BoxError, GraphError, Ports, Process, ProcessContext, Rack, Sample};

use crate::db::{db_to_linear, linear_to_db};
use crate::handle::Mono;

#[inline]
fn scale(sample: Sample, gain: f64) -> Sample {
    (f64::from(sample) * gain) as Sample
}

fn apply(ctx: &mut ProcessContext<'_>, gain: f64) -> Result<(), BoxError> {
    let out = ctx.sole_input()?.map(|s| scale(s, gain));
    ctx.set_sole_output(out)?;
    Ok(())
}

/// Multiplies by a linear factor.
#[derive(Debug, Clone, Copy)]
pub struct LinearGain {
    gain: f64,
}

impl LinearGain {
    /// A stage with the given factor.
    pub fn new(gain: f64) -> Self {
        Self { gain }
    }

    /// Adds a linear gain stage to `rack`.
    pub fn add(rack: &mut Rack, label: impl Into<String>, gain: f64) -> Result<Mono, GraphError> {
        Mono::add(rack, label, Self::new(gain))
    }

    /// The gain factor.
    pub fn gain(&self) -> f64 {
        self.gain
    }

    /// Sets the gain factor.
    pub fn set_gain(&mut self, gain: f64) {
        self.gain = gain;
    }
}

impl Default for LinearGain {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Process for LinearGain {
    fn ports(&self) -> Ports {
        Ports::mono()
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>) -> Result<(), BoxError> {
        apply(ctx, self.gain)
    }
}

/// Multiplies by `10^(db / 20)`.
///
/// ```rust
/// use patchbay_devices::Gain;
///
/// let gain = Gain::new(-6.02);
/// assert!((gain.linear() - 0.5).abs() < 1e-3);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Gain {
    db: f64,
    linear: f64,
}

impl Gain {
    /// A stage with the given gain in dB.
    pub fn new(db: f64) -> Self {
        Self {
            db,
            linear: db_to_linear(db),
        }
    }

    /// Adds a dB gain stage to `rack`.
    pub fn add(rack: &mut Rack, label: impl Into<String>, db: f64) -> Result<Mono, GraphError> {
        Mono::add(rack, label, Self::new(db))
    }

    /// A stage matching a linear factor.
    pub fn from_linear(gain: f64) -> Self {
        Self::new(linear_to_db(gain))
    }

    /// Gain in dB.
    pub fn db(&self) -> f64 {
        self.db
    }

    /// Gain as a linear factor.
    pub fn linear(&self) -> f64 {
        self.linear
    }

    /// Sets the gain in dB.
    pub fn set_db(&mut self, db: f64) {
        self.db = db;
        self.linear = db_to_linear(db);
    }
}

impl Process for Gain {
    fn ports(&self) -> Ports {
        Ports::mono()
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>) -> Result<(), BoxError> {
        apply(ctx, self.linear)
    }
}

/// Flips the sign of every sample.
///
/// Saturates at the top of the range: `Sample::MIN` becomes `Sample::MAX`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inverter;

impl Inverter {
    /// Adds an inverter to `rack`.
    pub fn add(rack: &mut Rack, label: impl Into<String>) -> Result<Mono, GraphError> {
        Mono::add(rack, label, Self)
    }
}

impl Process for Inverter {
    fn ports(&self) -> Ports {
        Ports::mono()
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>) -> Result<(), BoxError> {
        apply(ctx, -1.0)
    }
}
