//! Hard clipping at a dBFS threshold.

use patchbay_core::{BoxError, GraphError, Ports, Process, ProcessContext, Rack, Sample};

use crate::db::dbfs_to_linear;
use crate::handle::Mono;

/// Clamps every sample to `±linear(dbfs)`.
///
/// Thresholds at or above 0 dBFS pass everything except `Sample::MIN`, which
/// is pulled up to `-Sample::MAX` to keep the clipping symmetric.
#[derive(Debug, Clone, Copy)]
pub struct ClipDistortion {
    dbfs: f64,
    threshold: Sample,
}

impl ClipDistortion {
    /// A clipper at `dbfs`.
    pub fn new(dbfs: f64) -> Self {
        Self {
            dbfs,
            threshold: threshold(dbfs),
        }
    }

    /// Adds a clipper to `rack`.
    pub fn add(rack: &mut Rack, label: impl Into<String>, dbfs: f64) -> Result<Mono, GraphError> {
        Mono::add(rack, label, Self::new(dbfs))
    }

    /// Threshold in dBFS.
    pub fn dbfs(&self) -> f64 {
        self.dbfs
    }

    /// Threshold as a sample magnitude.
    pub fn threshold(&self) -> Sample {
        self.threshold
    }

    /// Moves the threshold.
    pub fn set_dbfs(&mut self, dbfs: f64) {
        self.dbfs = dbfs;
        self.threshold = threshold(dbfs);
    }
}

fn threshold(dbfs: f64) -> Sample {
    (dbfs_to_linear(dbfs) as Sample).max(0)
}

impl Process for ClipDistortion {
    fn ports(&self) -> Ports {
        Ports::mono()
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>) -> Result<(), BoxError> {
        let limit = self.threshold;
        let out = ctx.sole_input()?.map(|s| s.clamp(-limit, limit));
        ctx.set_sole_output(out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LINEAR_MAX;
    use crate::sources::DcSource;

    #[test]
    fn minus_twelve_dbfs_threshold() {
        let clip = ClipDistortion::new(-12.0);
        // 10^(-12/20) = 0.2512 of full scale
        let expected = (f64::from(LINEAR_MAX) * 0.251_188_643) as Sample;
        assert!((clip.threshold() - expected).abs() <= 1);
    }

    #[test]
    fn zero_dbfs_keeps_full_scale() {
        assert_eq!(ClipDistortion::new(0.0).threshold(), LINEAR_MAX);
        assert_eq!(ClipDistortion::new(6.0).threshold(), LINEAR_MAX);
    }

    fn clip_level(level: Sample, dbfs: f64) -> Vec<Sample> {
        let mut rack = Rack::new(44100.0, 4);
        let src = DcSource::add(&mut rack, "dc", level).unwrap();
        let clip = ClipDistortion::add(&mut rack, "clip", dbfs).unwrap();
        rack.patch(src.device, clip.device).unwrap();
        let root = rack.tick_root(clip.device).unwrap();
        rack.tick(root).unwrap();
        rack.buffer(clip.output).unwrap().unwrap().to_vec()
    }

    #[test]
    fn clamps_both_signs() {
        let limit = ClipDistortion::new(-6.02).threshold();
        assert_eq!(clip_level(LINEAR_MAX, -6.02), vec![limit; 4]);
        assert_eq!(clip_level(-LINEAR_MAX, -6.02), vec![-limit; 4]);
        assert_eq!(clip_level(12, -6.02), vec![12; 4]);
        assert_eq!(clip_level(Sample::MIN, 0.0), vec![-LINEAR_MAX; 4]);
    }
}
