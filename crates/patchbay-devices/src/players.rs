//! Devices that consume their input: printers and recorders.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use patchbay_core::{BoxError, GraphError, Ports, Process, ProcessContext, Rack, Sample};

use crate::handle::{Mono, Sink};

/// Writes every block it receives as `"{label}: {block}"` and forwards it
/// unchanged on its `thru` output.
///
/// With `bypass` set nothing is written, but the block is still forwarded so
/// downstream wiring behaves the same.
pub struct Printer {
    writer: Box<dyn Write + Send>,
    bypass: bool,
}

impl Printer {
    /// A printer writing to stdout.
    pub fn new(bypass: bool) -> Self {
        Self::with_writer(io::stdout(), bypass)
    }

    /// A printer writing to `writer`.
    pub fn with_writer(writer: impl Write + Send + 'static, bypass: bool) -> Self {
        Self {
            writer: Box::new(writer),
            bypass,
        }
    }

    /// Adds a stdout printer to `rack`.
    pub fn add(rack: &mut Rack, label: impl Into<String>, bypass: bool) -> Result<Mono, GraphError> {
        Mono::add(rack, label, Self::new(bypass))
    }

    /// Returns `true` if printing is suppressed.
    pub fn bypass(&self) -> bool {
        self.bypass
    }

    /// Suppresses or resumes printing.
    pub fn set_bypass(&mut self, bypass: bool) {
        self.bypass = bypass;
    }
}

impl fmt::Debug for Printer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Printer")
            .field("bypass", &self.bypass)
            .finish_non_exhaustive()
    }
}

impl Process for Printer {
    fn ports(&self) -> Ports {
        Ports::new().input("input").output("thru")
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>) -> Result<(), BoxError> {
        let block = ctx.sole_input()?.clone();
        if !self.bypass {
            writeln!(self.writer, "{}: {block}", ctx.label())?;
        }
        ctx.set_sole_output(block)?;
        Ok(())
    }
}

/// Bounded capture buffer shared between a [`Recorder`] and its owner.
#[derive(Clone, Debug, Default)]
pub struct Tape(Arc<Mutex<TapeState>>);

#[derive(Debug, Default)]
struct TapeState {
    samples: Vec<Sample>,
    capacity: usize,
}

impl Tape {
    fn with_capacity(capacity: usize) -> Self {
        Self(Arc::new(Mutex::new(TapeState {
            samples: Vec::with_capacity(capacity),
            capacity,
        })))
    }

    fn state(&self) -> std::sync::MutexGuard<'_, TapeState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of samples captured so far.
    pub fn len(&self) -> usize {
        self.state().samples.len()
    }

    /// Returns `true` if nothing was captured yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of samples the tape holds.
    pub fn capacity(&self) -> usize {
        self.state().capacity
    }

    /// Returns `true` once the capacity is reached.
    pub fn full(&self) -> bool {
        let state = self.state();
        state.samples.len() >= state.capacity
    }

    /// Removes and returns the captured samples, rewinding the tape.
    pub fn take(&self) -> Vec<Sample> {
        std::mem::take(&mut self.state().samples)
    }

    fn append(&self, block: &[Sample]) {
        let mut state = self.state();
        let room = state.capacity.saturating_sub(state.samples.len());
        let count = room.min(block.len());
        state.samples.extend_from_slice(&block[..count]);
    }
}

/// Appends every input block to a [`Tape`], dropping whatever exceeds its
/// capacity.
#[derive(Debug, Clone)]
pub struct Recorder {
    tape: Tape,
    bypass: bool,
}

impl Recorder {
    /// A recorder with room for `capacity` samples, plus the tape to read
    /// them back from.
    pub fn new(capacity: usize) -> (Self, Tape) {
        let tape = Tape::with_capacity(capacity);
        (
            Self {
                tape: tape.clone(),
                bypass: false,
            },
            tape,
        )
    }

    /// Adds a recorder to `rack`.
    pub fn add(
        rack: &mut Rack,
        label: impl Into<String>,
        capacity: usize,
    ) -> Result<(Sink, Tape), GraphError> {
        let (recorder, tape) = Self::new(capacity);
        Ok((Sink::add(rack, label, recorder)?, tape))
    }

    /// Suppresses or resumes recording.
    pub fn set_bypass(&mut self, bypass: bool) {
        self.bypass = bypass;
    }
}

impl Process for Recorder {
    fn ports(&self) -> Ports {
        Ports::sink()
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>) -> Result<(), BoxError> {
        if !self.bypass {
            self.tape.append(ctx.sole_input()?);
        }
        Ok(())
    }
}
