//! Typed handles returned when a leaf device is added to a rack.
//!
//! A handle bundles the device id with the endpoints a caller usually wires,
//! so single-channel chains need no name lookups.

use patchbay_core::{DeviceId, EndpointId, GraphError, Process, Rack, Role};

/// Anything that identifies a device in a rack.
pub trait Handle {
    /// The device this handle refers to.
    fn device(&self) -> DeviceId;
}

impl Handle for DeviceId {
    fn device(&self) -> DeviceId {
        *self
    }
}

/// A device with one Input and one Output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mono {
    /// The device.
    pub device: DeviceId,
    /// Its only Input.
    pub input: EndpointId,
    /// Its only Output.
    pub output: EndpointId,
}

/// A device with a single Output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Source {
    /// The device.
    pub device: DeviceId,
    /// Its only Output.
    pub output: EndpointId,
}

/// A device with a single Input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sink {
    /// The device.
    pub device: DeviceId,
    /// Its only Input.
    pub input: EndpointId,
}

impl Mono {
    /// Adds a single-input, single-output processor to `rack`.
    pub fn add(
        rack: &mut Rack,
        label: impl Into<String>,
        processor: impl Process + 'static,
    ) -> Result<Self, GraphError> {
        let device = rack.add_leaf(label, processor);
        Ok(Self {
            device,
            input: sole(rack, device, Role::Input)?,
            output: sole(rack, device, Role::Output)?,
        })
    }
}

impl Source {
    /// Adds a single-output processor to `rack`.
    pub fn add(
        rack: &mut Rack,
        label: impl Into<String>,
        processor: impl Process + 'static,
    ) -> Result<Self, GraphError> {
        let device = rack.add_leaf(label, processor);
        Ok(Self {
            device,
            output: sole(rack, device, Role::Output)?,
        })
    }
}

impl Sink {
    /// Adds a single-input processor to `rack`.
    pub fn add(
        rack: &mut Rack,
        label: impl Into<String>,
        processor: impl Process + 'static,
    ) -> Result<Self, GraphError> {
        let device = rack.add_leaf(label, processor);
        Ok(Self {
            device,
            input: sole(rack, device, Role::Input)?,
        })
    }
}

impl Handle for Mono {
    fn device(&self) -> DeviceId {
        self.device
    }
}

impl Handle for Source {
    fn device(&self) -> DeviceId {
        self.device
    }
}

impl Handle for Sink {
    fn device(&self) -> DeviceId {
        self.device
    }
}

fn sole(rack: &Rack, device: DeviceId, role: Role) -> Result<EndpointId, GraphError> {
    let ports: Vec<EndpointId> = match role {
        Role::Input => rack.inputs(device)?.map(|(_, id)| id).collect(),
        Role::Output => rack.outputs(device)?.map(|(_, id)| id).collect(),
    };
    match ports.as_slice() {
        [id] => Ok(*id),
        other => Err(GraphError::AmbiguousPort {
            device,
            role,
            count: other.len(),
        }),
    }
}
