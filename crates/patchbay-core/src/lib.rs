//! Patchbay Core - a modular signal-flow graph
//!
//! Typed endpoints on processing devices are wired together, devices nest
//! hierarchically, and a tick propagates one block of samples through the
//! whole reachable graph exactly once.
//!
//! # Core Abstractions
//!
//! ## Arena
//!
//! - [`Rack`] - Owns every device, endpoint and collection; hands out copyable
//!   [`DeviceId`], [`EndpointId`] and [`CollectionId`] handles
//!
//! ## Wiring
//!
//! - [`Rack::connect`], [`Rack::connect_forward`], [`Rack::connect_backward`] -
//!   Undirected and directed connections, each returning the right-hand operand
//! - [`Rack::disconnect`] - Removes every edge of an endpoint
//! - [`Wire`] - Fluent chain builder over the same operations
//! - [`Rack::patch`] - Device-level connection of sole output to sole input
//!
//! ## Composition
//!
//! - [`Rack::add_subdevice`] - Owning, hierarchical nesting
//! - [`Rack::collect`], [`Rack::merge`], [`Rack::group`] - Flat, non-owning
//!   collections
//!
//! ## Processing
//!
//! - [`Process`] - Contract implemented by leaf devices
//! - [`Rack::tick`] - Topologically ordered, cycle-checked propagation pass
//! - [`SampleBuffer`] - Shared copy-on-write block passed along edges
//!
//! # Example
//!
//! ```rust
//! use patchbay_core::{BoxError, Ports, Process, ProcessContext, Rack, SampleBuffer};
//!
//! struct Ramp;
//!
//! impl Process for Ramp {
//!     fn ports(&self) -> Ports {
//!         Ports::source()
//!     }
//!
//!     fn process(&mut self, ctx: &mut ProcessContext<'_>) -> Result<(), BoxError> {
//!         let ramp: SampleBuffer = (0..ctx.block_size() as i32).collect();
//!         ctx.set_sole_output(ramp)?;
//!         Ok(())
//!     }
//! }
//!
//! let mut rack = Rack::new(44100.0, 4);
//! let ramp = rack.add_leaf("ramp", Ramp);
//! let sink = rack.add_device("sink");
//! let input = rack.add_input(sink, "in")?;
//!
//! let out = rack.output(ramp, "output")?;
//! rack.connect_forward(out, input)?;
//! let root = rack.group(ramp, sink)?;
//! rack.tick(root)?;
//!
//! assert_eq!(rack.buffer(input)?.map(|b| b.as_slice()), Some(&[0, 1, 2, 3][..]));
//! # Ok::<(), patchbay_core::GraphError>(())
//! ```
//!
//! # Feature Flags
//!
//! - `tracing` - Emits `tracing` events for wiring changes and tick execution

pub mod buffer;
pub mod collection;
pub mod connect;
pub mod device;
pub mod endpoint;
pub mod error;
pub mod process;
pub mod rack;
pub mod schedule;

// Re-export main types at crate root
pub use buffer::{Sample, SampleBuffer};
pub use collection::CollectionId;
pub use connect::{Wire, identity};
pub use device::{Container, DeviceId, Members};
pub use endpoint::{EndpointId, Role};
pub use error::{BoxError, GraphError};
pub use process::{Ports, Process, ProcessContext};
pub use rack::{DEFAULT_BLOCK_SIZE, DEFAULT_SAMPLE_RATE, Rack};
pub use schedule::Root;
