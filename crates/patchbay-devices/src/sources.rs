//! Devices that only produce output.
//!
//! Every source has a single Output named `output` and emits one full block
//! per tick.

use patchbay_core::{
    BoxError, GraphError, Ports, Process, ProcessContext, Rack, Sample, SampleBuffer,
};

use crate::handle::Source;

/// Emits blocks of zeros.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilenceSource;

impl SilenceSource {
    /// Adds a silence source to `rack`.
    pub fn add(rack: &mut Rack, label: impl Into<String>) -> Result<Source, GraphError> {
        Source::add(rack, label, Self)
    }
}

impl Process for SilenceSource {
    fn ports(&self) -> Ports {
        Ports::source()
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>) -> Result<(), BoxError> {
        ctx.set_sole_output(SampleBuffer::silence(ctx.block_size()))?;
        Ok(())
    }
}

/// Emits a constant level.
#[derive(Debug, Clone, Copy)]
pub struct DcSource {
    level: Sample,
}

impl DcSource {
    /// A source holding `level`.
    pub fn new(level: Sample) -> Self {
        Self { level }
    }

    /// Adds a DC source to `rack`.
    pub fn add(
        rack: &mut Rack,
        label: impl Into<String>,
        level: Sample,
    ) -> Result<Source, GraphError> {
        Source::add(rack, label, Self::new(level))
    }

    /// The emitted level.
    pub fn level(&self) -> Sample {
        self.level
    }
}

impl Process for DcSource {
    fn ports(&self) -> Ports {
        Ports::source()
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>) -> Result<(), BoxError> {
        ctx.set_sole_output(SampleBuffer::filled(ctx.block_size(), self.level))?;
        Ok(())
    }
}

/// Uniform white noise in `[-level, level)`.
///
/// Samples come from a 32-bit LCG PRNG with the Numerical Recipes constants
/// (`a = 1664525`, `c = 1013904223`), so a given seed always produces the same
/// sequence.
#[derive(Debug, Clone)]
pub struct NoiseSource {
    level: Sample,
    rng_state: u32,
}

impl NoiseSource {
    /// Default PRNG seed.
    pub const DEFAULT_SEED: u32 = 0x1234_5678;

    /// A noise source with the default seed.
    pub fn new(level: Sample) -> Self {
        Self::with_seed(level, Self::DEFAULT_SEED)
    }

    /// A noise source with an explicit seed.
    pub fn with_seed(level: Sample, seed: u32) -> Self {
        Self {
            level,
            rng_state: seed,
        }
    }

    /// Adds a noise source to `rack`.
    pub fn add(
        rack: &mut Rack,
        label: impl Into<String>,
        level: Sample,
        seed: u32,
    ) -> Result<Source, GraphError> {
        Source::add(rack, label, Self::with_seed(level, seed))
    }

    /// Peak level of the noise.
    pub fn level(&self) -> Sample {
        self.level
    }

    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.rng_state = self
            .rng_state
            .wrapping_mul(1_664_525)
            .wrapping_add(1_013_904_223);
        self.rng_state
    }

    /// Next sample, scaled from the full 32-bit state onto the output range.
    #[inline]
    fn next_sample(&mut self) -> Sample {
        let magnitude = i64::from(self.level.unsigned_abs());
        let span = 2 * magnitude as u64;
        let offset = (u64::from(self.next_u32()) * span) >> 32;
        (offset as i64 - magnitude) as Sample
    }
}

impl Process for NoiseSource {
    fn ports(&self) -> Ports {
        Ports::source()
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>) -> Result<(), BoxError> {
        let block: SampleBuffer = (0..ctx.block_size()).map(|_| self.next_sample()).collect();
        ctx.set_sole_output(block)?;
        Ok(())
    }
}
