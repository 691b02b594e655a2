//! The per-tick contract between the scheduler and leaf devices.
//!
//! A leaf device is driven by a [`Process`] implementation. The processor
//! declares its port names once, when the device is added to a rack, and is
//! then invoked exactly once per tick with a [`ProcessContext`] that exposes
//! the current input blocks and collects the blocks it produces.
//!
//! ```rust
//! use patchbay_core::{BoxError, Ports, Process, ProcessContext, Rack};
//!
//! struct Double;
//!
//! impl Process for Double {
//!     fn ports(&self) -> Ports {
//!         Ports::mono()
//!     }
//!
//!     fn process(&mut self, ctx: &mut ProcessContext<'_>) -> Result<(), BoxError> {
//!         let doubled = ctx.sole_input()?.map(|s| s.saturating_mul(2));
//!         ctx.set_sole_output(doubled)?;
//!         Ok(())
//!     }
//! }
//!
//! let mut rack = Rack::new(44100.0, 16);
//! let dev = rack.add_leaf("double", Double);
//! assert!(rack.input(dev, "input").is_ok());
//! assert!(rack.output(dev, "output").is_ok());
//! ```

use crate::buffer::SampleBuffer;
use crate::device::DeviceId;
use crate::endpoint::{EndpointId, Role};
use crate::error::{BoxError, GraphError};

/// Port names declared by a processor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ports {
    /// Input names in declaration order.
    pub inputs: Vec<String>,
    /// Output names in declaration order.
    pub outputs: Vec<String>,
}

impl Ports {
    /// No ports at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// One `input` and one `output`.
    pub fn mono() -> Self {
        Self::new().input("input").output("output")
    }

    /// A single `output`.
    pub fn source() -> Self {
        Self::new().output("output")
    }

    /// A single `input`.
    pub fn sink() -> Self {
        Self::new().input("input")
    }

    /// Adds an input name.
    #[must_use]
    pub fn input(mut self, name: impl Into<String>) -> Self {
        self.inputs.push(name.into());
        self
    }

    /// Adds an output name.
    #[must_use]
    pub fn output(mut self, name: impl Into<String>) -> Self {
        self.outputs.push(name.into());
        self
    }
}

/// Processing function of a leaf device.
///
/// `Send` so that a whole [`Rack`](crate::Rack) can move between threads.
pub trait Process: Send {
    /// Ports to create on the device.
    fn ports(&self) -> Ports;

    /// Runs one tick.
    ///
    /// Outputs that are not set through the context deliver nothing this tick.
    /// An error aborts the rest of the tick.
    fn process(&mut self, ctx: &mut ProcessContext<'_>) -> Result<(), BoxError>;
}

/// View of a leaf device during one tick.
pub struct ProcessContext<'a> {
    label: &'a str,
    device: DeviceId,
    block_size: usize,
    sample_rate: f32,
    inputs: Vec<(&'a str, SampleBuffer)>,
    outputs: Vec<(&'a str, EndpointId, Option<SampleBuffer>)>,
}

impl<'a> ProcessContext<'a> {
    pub(crate) fn new(
        label: &'a str,
        device: DeviceId,
        block_size: usize,
        sample_rate: f32,
        inputs: Vec<(&'a str, SampleBuffer)>,
        outputs: impl IntoIterator<Item = (&'a str, EndpointId)>,
    ) -> Self {
        Self {
            label,
            device,
            block_size,
            sample_rate,
            inputs,
            outputs: outputs
                .into_iter()
                .map(|(name, id)| (name, id, None))
                .collect(),
        }
    }

    /// Label of the device being processed.
    pub fn label(&self) -> &str {
        self.label
    }

    /// Handle of the device being processed.
    pub fn device(&self) -> DeviceId {
        self.device
    }

    /// Rack block size in samples.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Rack sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Block on the named input; silence if nothing was delivered this tick.
    pub fn input(&self, name: &str) -> Result<&SampleBuffer, GraphError> {
        self.inputs
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, buffer)| buffer)
            .ok_or_else(|| missing(self.device, Role::Input, name))
    }

    /// All inputs in declaration order.
    pub fn inputs(&self) -> impl Iterator<Item = (&str, &SampleBuffer)> {
        self.inputs.iter().map(|(name, buffer)| (*name, buffer))
    }

    /// The only input of a single-input device.
    pub fn sole_input(&self) -> Result<&SampleBuffer, GraphError> {
        match self.inputs.as_slice() {
            [(_, buffer)] => Ok(buffer),
            other => Err(GraphError::AmbiguousPort {
                device: self.device,
                role: Role::Input,
                count: other.len(),
            }),
        }
    }

    /// Stores the block the named output will deliver.
    pub fn set_output(&mut self, name: &str, buffer: SampleBuffer) -> Result<(), GraphError> {
        let device = self.device;
        match self.outputs.iter_mut().find(|(n, _, _)| *n == name) {
            Some((_, _, slot)) => {
                *slot = Some(buffer);
                Ok(())
            }
            None => Err(missing(device, Role::Output, name)),
        }
    }

    /// Stores the block of a single-output device.
    pub fn set_sole_output(&mut self, buffer: SampleBuffer) -> Result<(), GraphError> {
        let count = self.outputs.len();
        match self.outputs.as_mut_slice() {
            [(_, _, slot)] => {
                *slot = Some(buffer);
                Ok(())
            }
            _ => Err(GraphError::AmbiguousPort {
                device: self.device,
                role: Role::Output,
                count,
            }),
        }
    }

    pub(crate) fn into_outputs(self) -> Vec<(EndpointId, Option<SampleBuffer>)> {
        self.outputs
            .into_iter()
            .map(|(_, id, buffer)| (id, buffer))
            .collect()
    }
}

fn missing(device: DeviceId, role: Role, name: &str) -> GraphError {
    GraphError::PortNotFound {
        device,
        role,
        name: name.to_string(),
    }
}
