//! Endpoints: the typed connection points of a device.
//!
//! Each endpoint has a [`Role`], a name unique among the owning device's
//! endpoints of that role, the set of peers it is connected to, and a single
//! buffer slot. Edges are stored symmetrically in both endpoints; see
//! [`connect`](crate::connect) for the rules that create them.

use std::fmt;

use crate::Rack;
use crate::buffer::SampleBuffer;
use crate::device::DeviceId;
use crate::error::GraphError;

/// Unique identifier for an endpoint in a [`Rack`].
///
/// Endpoint IDs are assigned sequentially and never reused within a rack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndpointId(pub(crate) u32);

impl EndpointId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EndpointId({})", self.0)
    }
}

/// Direction of an endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Receives data delivered by connected outputs.
    Input,
    /// Holds data produced by its device and delivers it to connected inputs.
    Output,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// Internal bookkeeping for an endpoint.
pub(crate) struct EndpointData {
    pub role: Role,
    pub name: String,
    pub owner: DeviceId,
    /// Connected endpoints, in connection order.
    pub peers: Vec<EndpointId>,
    /// Most recently delivered (input) or produced (output) block.
    pub buffer: Option<SampleBuffer>,
}

impl EndpointData {
    pub fn new(role: Role, name: String, owner: DeviceId) -> Self {
        Self {
            role,
            name,
            owner,
            peers: Vec::new(),
            buffer: None,
        }
    }
}

pub(crate) fn slot_mut(
    endpoints: &mut [Option<EndpointData>],
    id: EndpointId,
) -> Result<&mut EndpointData, GraphError> {
    endpoints
        .get_mut(id.0 as usize)
        .and_then(Option::as_mut)
        .ok_or(GraphError::EndpointNotFound(id))
}

/// Hands the block in `from`'s slot to every peer, one shared clone each.
/// An empty slot delivers nothing.
pub(crate) fn deliver(
    endpoints: &mut [Option<EndpointData>],
    from: EndpointId,
) -> Result<(), GraphError> {
    let data = slot_mut(endpoints, from)?;
    let Some(buffer) = data.buffer.clone() else {
        return Ok(());
    };
    let peers = data.peers.clone();
    for peer in peers {
        slot_mut(endpoints, peer)?.buffer = Some(buffer.clone());
    }
    Ok(())
}

impl Rack {
    /// Role of an endpoint.
    pub fn role(&self, endpoint: EndpointId) -> Result<Role, GraphError> {
        Ok(self.endpoint(endpoint)?.role)
    }

    /// Name of an endpoint within its device.
    pub fn endpoint_name(&self, endpoint: EndpointId) -> Result<&str, GraphError> {
        Ok(&self.endpoint(endpoint)?.name)
    }

    /// Device that owns an endpoint.
    pub fn endpoint_owner(&self, endpoint: EndpointId) -> Result<DeviceId, GraphError> {
        Ok(self.endpoint(endpoint)?.owner)
    }

    /// Endpoints currently connected to `endpoint`, in connection order.
    pub fn peers(&self, endpoint: EndpointId) -> Result<&[EndpointId], GraphError> {
        Ok(&self.endpoint(endpoint)?.peers)
    }

    /// Contents of an endpoint's buffer slot, if any.
    pub fn buffer(&self, endpoint: EndpointId) -> Result<Option<&SampleBuffer>, GraphError> {
        Ok(self.endpoint(endpoint)?.buffer.as_ref())
    }

    /// Places a block into an endpoint's buffer slot, replacing what was there.
    pub fn load(
        &mut self,
        endpoint: EndpointId,
        buffer: SampleBuffer,
    ) -> Result<EndpointId, GraphError> {
        self.endpoint_mut(endpoint)?.buffer = Some(buffer);
        Ok(endpoint)
    }

    /// Empties an endpoint's buffer slot.
    pub fn clear(&mut self, endpoint: EndpointId) -> Result<EndpointId, GraphError> {
        self.endpoint_mut(endpoint)?.buffer = None;
        Ok(endpoint)
    }

    /// Takes the block out of an endpoint's buffer slot, leaving it empty.
    pub fn read(&mut self, endpoint: EndpointId) -> Result<Option<SampleBuffer>, GraphError> {
        Ok(self.endpoint_mut(endpoint)?.buffer.take())
    }

    /// Sends an endpoint's buffer to every connected peer.
    ///
    /// Each peer receives a clone of the same shared block. Pushing an empty
    /// slot delivers nothing.
    pub fn push(&mut self, endpoint: EndpointId) -> Result<EndpointId, GraphError> {
        deliver(&mut self.endpoints, endpoint)?;
        Ok(endpoint)
    }

    /// Pushes an endpoint's buffer to its peers, then empties the slot.
    pub fn flush(&mut self, endpoint: EndpointId) -> Result<EndpointId, GraphError> {
        self.push(endpoint)?;
        self.clear(endpoint)
    }
}
