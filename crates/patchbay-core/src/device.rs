//! Devices and their hierarchical composition.
//!
//! A device owns its endpoints and an ordered list of subdevices. Ownership is
//! a strict tree: a device has at most one parent, and nesting a device under a
//! new parent moves it. Independently of ownership, every device remembers the
//! last [`Container`] that aggregated it (a parent device or a collection);
//! that back-reference is only used by [`Rack::tick_root`].
//!
//! A device with no subdevices is a *leaf*: the unit the scheduler runs.

use std::collections::HashSet;
use std::fmt;

use crate::Rack;
use crate::collection::CollectionId;
use crate::endpoint::{EndpointData, EndpointId, Role};
use crate::error::GraphError;
use crate::process::Process;
use crate::schedule::Root;

/// Unique identifier for a device in a [`Rack`].
///
/// Device IDs are assigned sequentially and never reused within a rack, so
/// their order is declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub(crate) u32);

impl DeviceId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({})", self.0)
    }
}

/// Non-owning back-reference to whatever most recently aggregated a device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Container {
    /// Nested as a subdevice of this device.
    Device(DeviceId),
    /// Collected into this collection.
    Collection(CollectionId),
}

/// Operand of a composition call: one device or an ordered sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Members {
    /// A single device.
    One(DeviceId),
    /// Several devices, processed in order.
    Many(Vec<DeviceId>),
}

impl Members {
    /// The operand as a slice (a singleton for [`Members::One`]).
    pub fn as_slice(&self) -> &[DeviceId] {
        match self {
            Self::One(device) => std::slice::from_ref(device),
            Self::Many(devices) => devices,
        }
    }

    /// Number of devices in the operand.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Returns `true` for an empty sequence.
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl From<DeviceId> for Members {
    fn from(device: DeviceId) -> Self {
        Self::One(device)
    }
}

impl From<Vec<DeviceId>> for Members {
    fn from(devices: Vec<DeviceId>) -> Self {
        Self::Many(devices)
    }
}

impl From<&[DeviceId]> for Members {
    fn from(devices: &[DeviceId]) -> Self {
        Self::Many(devices.to_vec())
    }
}

impl<const N: usize> From<[DeviceId; N]> for Members {
    fn from(devices: [DeviceId; N]) -> Self {
        Self::Many(devices.to_vec())
    }
}

/// Internal bookkeeping for a device.
pub(crate) struct DeviceData {
    pub label: String,
    /// Input endpoints in declaration order.
    pub inputs: Vec<(String, EndpointId)>,
    /// Output endpoints in declaration order.
    pub outputs: Vec<(String, EndpointId)>,
    pub subdevices: Vec<DeviceId>,
    pub parent: Option<DeviceId>,
    pub container: Option<Container>,
    /// Invoked once per tick while the device is a leaf.
    pub processor: Option<Box<dyn Process>>,
}

impl DeviceData {
    fn new(label: String) -> Self {
        Self {
            label,
            inputs: Vec::new(),
            outputs: Vec::new(),
            subdevices: Vec::new(),
            parent: None,
            container: None,
            processor: None,
        }
    }

    pub fn ports(&self, role: Role) -> &[(String, EndpointId)] {
        match role {
            Role::Input => &self.inputs,
            Role::Output => &self.outputs,
        }
    }

    fn ports_mut(&mut self, role: Role) -> &mut Vec<(String, EndpointId)> {
        match role {
            Role::Input => &mut self.inputs,
            Role::Output => &mut self.outputs,
        }
    }
}

/// Makes `name` unique among `ports` by appending the smallest free counter
/// starting at 2 (`out`, `out2`, `out3`, ...).
fn unique_name(name: &str, ports: &[(String, EndpointId)]) -> String {
    let taken = |candidate: &str| ports.iter().any(|(n, _)| n == candidate);
    if !taken(name) {
        return name.to_string();
    }
    (2..)
        .map(|counter| format!("{name}{counter}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| name.to_string())
}

/// Allocates an endpoint in the arena and records it in `ports`.
fn register_port(
    endpoints: &mut Vec<Option<EndpointData>>,
    ports: &mut Vec<(String, EndpointId)>,
    role: Role,
    name: &str,
    owner: DeviceId,
) -> EndpointId {
    let id = EndpointId(endpoints.len() as u32);
    let name = unique_name(name, ports);
    ports.push((name.clone(), id));
    endpoints.push(Some(EndpointData::new(role, name, owner)));
    id
}

impl Rack {
    /// Adds a device without a processor.
    ///
    /// Such a device is either a composite (once it has subdevices) or an
    /// inert leaf whose outputs never produce data.
    pub fn add_device(&mut self, label: impl Into<String>) -> DeviceId {
        let id = DeviceId(self.devices.len() as u32);
        self.devices.push(Some(DeviceData::new(label.into())));
        id
    }

    /// Adds a leaf device driven by `processor`.
    ///
    /// One endpoint is created for every port the processor declares.
    pub fn add_leaf(
        &mut self,
        label: impl Into<String>,
        processor: impl Process + 'static,
    ) -> DeviceId {
        let id = DeviceId(self.devices.len() as u32);
        let mut data = DeviceData::new(label.into());
        let ports = processor.ports();
        for name in &ports.inputs {
            register_port(&mut self.endpoints, &mut data.inputs, Role::Input, name, id);
        }
        for name in &ports.outputs {
            register_port(&mut self.endpoints, &mut data.outputs, Role::Output, name, id);
        }
        data.processor = Some(Box::new(processor));
        self.devices.push(Some(data));

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "add_leaf: {id} with {} inputs, {} outputs",
            ports.inputs.len(),
            ports.outputs.len()
        );
        id
    }

    /// Adds an Input endpoint to a device. A taken name gets a numeric suffix.
    pub fn add_input(&mut self, device: DeviceId, name: &str) -> Result<EndpointId, GraphError> {
        self.add_endpoint(device, Role::Input, name)
    }

    /// Adds an Output endpoint to a device. A taken name gets a numeric suffix.
    pub fn add_output(&mut self, device: DeviceId, name: &str) -> Result<EndpointId, GraphError> {
        self.add_endpoint(device, Role::Output, name)
    }

    fn add_endpoint(
        &mut self,
        device: DeviceId,
        role: Role,
        name: &str,
    ) -> Result<EndpointId, GraphError> {
        let Self {
            devices, endpoints, ..
        } = self;
        let data = devices
            .get_mut(device.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(GraphError::DeviceNotFound(device))?;
        Ok(register_port(endpoints, data.ports_mut(role), role, name, device))
    }

    /// Looks up an Input by name.
    pub fn input(&self, device: DeviceId, name: &str) -> Result<EndpointId, GraphError> {
        self.port(device, Role::Input, name)
    }

    /// Looks up an Output by name.
    pub fn output(&self, device: DeviceId, name: &str) -> Result<EndpointId, GraphError> {
        self.port(device, Role::Output, name)
    }

    fn port(&self, device: DeviceId, role: Role, name: &str) -> Result<EndpointId, GraphError> {
        self.ports(device, role)?
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
            .ok_or_else(|| GraphError::PortNotFound {
                device,
                role,
                name: name.to_string(),
            })
    }

    pub(crate) fn ports(
        &self,
        device: DeviceId,
        role: Role,
    ) -> Result<&[(String, EndpointId)], GraphError> {
        Ok(self.device(device)?.ports(role))
    }

    /// A device's Inputs as `(name, id)` pairs in declaration order.
    pub fn inputs(
        &self,
        device: DeviceId,
    ) -> Result<impl Iterator<Item = (&str, EndpointId)>, GraphError> {
        Ok(self
            .ports(device, Role::Input)?
            .iter()
            .map(|(name, id)| (name.as_str(), *id)))
    }

    /// A device's Outputs as `(name, id)` pairs in declaration order.
    pub fn outputs(
        &self,
        device: DeviceId,
    ) -> Result<impl Iterator<Item = (&str, EndpointId)>, GraphError> {
        Ok(self
            .ports(device, Role::Output)?
            .iter()
            .map(|(name, id)| (name.as_str(), *id)))
    }

    /// A device's label.
    pub fn label(&self, device: DeviceId) -> Result<&str, GraphError> {
        Ok(&self.device(device)?.label)
    }

    /// Renames a device.
    pub fn set_label(
        &mut self,
        device: DeviceId,
        label: impl Into<String>,
    ) -> Result<DeviceId, GraphError> {
        self.device_mut(device)?.label = label.into();
        Ok(device)
    }

    /// Owned subdevices in insertion order.
    pub fn subdevices(&self, device: DeviceId) -> Result<&[DeviceId], GraphError> {
        Ok(&self.device(device)?.subdevices)
    }

    /// The owning parent, if the device is nested.
    pub fn parent(&self, device: DeviceId) -> Result<Option<DeviceId>, GraphError> {
        Ok(self.device(device)?.parent)
    }

    /// Whatever most recently aggregated the device.
    pub fn container(&self, device: DeviceId) -> Result<Option<Container>, GraphError> {
        Ok(self.device(device)?.container)
    }

    /// Returns `true` if the device has no subdevices.
    pub fn is_leaf(&self, device: DeviceId) -> Result<bool, GraphError> {
        Ok(self.device(device)?.subdevices.is_empty())
    }

    /// Nests `children` under `parent` and returns `children`.
    ///
    /// Every element is added in order. Re-adding a subdevice that `parent`
    /// already owns leaves the sequence unchanged; a child owned elsewhere is
    /// moved. Each child's container becomes `parent`. Fails with
    /// [`GraphError::OwnershipCycle`] before any change if a child is `parent`
    /// itself or one of its ancestors.
    pub fn add_subdevice(
        &mut self,
        parent: DeviceId,
        children: impl Into<Members>,
    ) -> Result<Members, GraphError> {
        let children = children.into();
        self.device(parent)?;
        for &child in children.as_slice() {
            self.device(child)?;
            if self.is_ancestor_or_self(child, parent)? {
                return Err(GraphError::OwnershipCycle { parent, child });
            }
        }
        for &child in children.as_slice() {
            self.adopt(parent, child)?;
        }
        Ok(children)
    }

    /// Same effect as [`add_subdevice`](Self::add_subdevice), but returns
    /// `parent`, so a hierarchy can be grown while keeping the root in hand.
    pub fn add_subdevice_reversed(
        &mut self,
        children: impl Into<Members>,
        parent: DeviceId,
    ) -> Result<DeviceId, GraphError> {
        self.add_subdevice(parent, children)?;
        Ok(parent)
    }

    fn is_ancestor_or_self(
        &self,
        candidate: DeviceId,
        device: DeviceId,
    ) -> Result<bool, GraphError> {
        let mut current = Some(device);
        while let Some(id) = current {
            if id == candidate {
                return Ok(true);
            }
            current = self.device(id)?.parent;
        }
        Ok(false)
    }

    fn adopt(&mut self, parent: DeviceId, child: DeviceId) -> Result<(), GraphError> {
        let previous = self.device(child)?.parent;
        if previous != Some(parent) {
            if let Some(old) = previous {
                self.device_mut(old)?.subdevices.retain(|d| *d != child);
            }
            self.device_mut(parent)?.subdevices.push(child);
            #[cfg(feature = "tracing")]
            tracing::debug!("add_subdevice: {child} under {parent}");
        }
        let data = self.device_mut(child)?;
        data.parent = Some(parent);
        data.container = Some(Container::Device(parent));
        Ok(())
    }

    /// Destroys a device together with its endpoints, edges and subtree.
    ///
    /// The device is also dropped from its parent and from every collection.
    pub fn remove_device(&mut self, device: DeviceId) -> Result<(), GraphError> {
        if let Some(parent) = self.device(device)?.parent {
            self.device_mut(parent)?.subdevices.retain(|d| *d != device);
        }

        let mut doomed = HashSet::new();
        let mut stack = vec![device];
        while let Some(id) = stack.pop() {
            let data = self.device(id)?;
            stack.extend(data.subdevices.iter().copied());
            doomed.insert(id);
        }

        for &id in &doomed {
            let Some(data) = self.devices[id.0 as usize].take() else {
                continue;
            };
            for (_, endpoint) in data.inputs.iter().chain(&data.outputs) {
                self.disconnect(*endpoint)?;
                self.endpoints[endpoint.0 as usize] = None;
            }
        }

        for collection in self.collections.iter_mut().flatten() {
            collection.members.retain(|m| !doomed.contains(m));
        }
        for data in self.devices.iter_mut().flatten() {
            if matches!(data.container, Some(Container::Device(p)) if doomed.contains(&p)) {
                data.container = None;
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("remove_device: {device} ({} devices removed)", doomed.len());
        Ok(())
    }

    /// Finds the root to tick for `device`.
    ///
    /// Follows container back-references upward and stops at the first
    /// collection, or at a device that was never aggregated.
    pub fn tick_root(&self, device: DeviceId) -> Result<Root, GraphError> {
        let mut current = device;
        loop {
            match self.device(current)?.container {
                None => return Ok(Root::Device(current)),
                Some(Container::Collection(c)) => return Ok(Root::Collection(c)),
                Some(Container::Device(parent)) => current = parent,
            }
        }
    }

    /// Renders the hierarchy under `root` as indented text.
    ///
    /// Inputs are shown as `<- name [peers]`, outputs as `-> name [peers]`,
    /// peers as `device.port`.
    pub fn tree(&self, root: impl Into<Root>) -> Result<String, GraphError> {
        let mut out = String::new();
        match root.into() {
            Root::Device(device) => self.write_device(&mut out, device, 0)?,
            Root::Collection(collection) => {
                let data = self.collection(collection)?;
                out.push_str(&format!("{} (collection)\n", data.label));
                for &member in &data.members {
                    self.write_device(&mut out, member, 1)?;
                }
            }
        }
        Ok(out)
    }

    fn write_device(&self, out: &mut String, device: DeviceId, depth: usize) -> Result<(), GraphError> {
        let data = self.device(device)?;
        let pad = "  ".repeat(depth);
        out.push_str(&format!("{pad}{}\n", data.label));
        for (arrow, ports) in [("<-", &data.inputs), ("->", &data.outputs)] {
            for (name, endpoint) in ports {
                let peers = self
                    .endpoint(*endpoint)?
                    .peers
                    .iter()
                    .map(|peer| self.qualified_name(*peer))
                    .collect::<Result<Vec<_>, _>>()?;
                out.push_str(&format!("{pad}  {arrow} {name} [{}]\n", peers.join(", ")));
            }
        }
        for &sub in &data.subdevices {
            self.write_device(out, sub, depth + 1)?;
        }
        Ok(())
    }

    fn qualified_name(&self, endpoint: EndpointId) -> Result<String, GraphError> {
        let data = self.endpoint(endpoint)?;
        Ok(format!("{}.{}", self.device(data.owner)?.label, data.name))
    }
}
