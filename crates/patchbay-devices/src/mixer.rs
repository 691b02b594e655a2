//! Explicit fan-in: summing several inputs into one output.

use patchbay_core::{BoxError, DeviceId, Ports, Process, ProcessContext, Rack, Sample};

/// Saturating sum of `inputs` inputs named `input-0`, `input-1`, ...
///
/// Inputs of different lengths are summed as if padded with zeros.
#[derive(Debug, Clone, Copy)]
pub struct Mixer {
    inputs: usize,
}

impl Mixer {
    /// A mixer with `inputs` channels.
    pub fn new(inputs: usize) -> Self {
        Self { inputs }
    }

    /// Adds a mixer to `rack`. Channels are found with
    /// [`Rack::input`](patchbay_core::Rack::input) by name.
    pub fn add(rack: &mut Rack, label: impl Into<String>, inputs: usize) -> DeviceId {
        rack.add_leaf(label, Self::new(inputs))
    }

    /// Name of channel `index`.
    pub fn channel(index: usize) -> String {
        format!("input-{index}")
    }

    /// Number of channels.
    pub fn inputs(&self) -> usize {
        self.inputs
    }
}

impl Process for Mixer {
    fn ports(&self) -> Ports {
        (0..self.inputs)
            .fold(Ports::new(), |ports, i| ports.input(Self::channel(i)))
            .output("output")
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>) -> Result<(), BoxError> {
        let len = ctx
            .inputs()
            .map(|(_, block)| block.len())
            .max()
            .unwrap_or(ctx.block_size());
        let mut sum: Vec<Sample> = vec![0; len];
        for (_, block) in ctx.inputs() {
            for (acc, &s) in sum.iter_mut().zip(block.iter()) {
                *acc = acc.saturating_add(s);
            }
        }
        ctx.set_output("output", sum.into())?;
        Ok(())
    }
}
