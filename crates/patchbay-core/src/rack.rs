//! The arena that owns every device, endpoint and collection.
//!
//! All graph objects live in slot vectors indexed by their handle. Removing a
//! device empties its slots instead of compacting, so handles stay stable and
//! are never reused.

use crate::collection::{CollectionData, CollectionId};
use crate::device::{DeviceData, DeviceId};
use crate::endpoint::{EndpointData, EndpointId};
use crate::error::GraphError;

/// Sample rate used by [`Rack::default`].
pub const DEFAULT_SAMPLE_RATE: f32 = 44100.0;

/// Block size used by [`Rack::default`].
pub const DEFAULT_BLOCK_SIZE: usize = 64;

/// Arena holding a signal-flow graph.
///
/// Every operation on devices, endpoints and collections goes through the
/// rack, addressed by the copyable handles it hands out.
pub struct Rack {
    pub(crate) devices: Vec<Option<DeviceData>>,
    pub(crate) endpoints: Vec<Option<EndpointData>>,
    pub(crate) collections: Vec<Option<CollectionData>>,
    pub(crate) sample_rate: f32,
    pub(crate) block_size: usize,
}

impl Rack {
    /// Creates an empty rack.
    ///
    /// `block_size` is the length of the silence block an undelivered Input
    /// reads during a tick.
    pub fn new(sample_rate: f32, block_size: usize) -> Self {
        Self {
            devices: Vec::new(),
            endpoints: Vec::new(),
            collections: Vec::new(),
            sample_rate,
            block_size,
        }
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Block size in samples.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of live devices.
    pub fn device_count(&self) -> usize {
        self.devices.iter().flatten().count()
    }

    /// Number of live collections.
    pub fn collection_count(&self) -> usize {
        self.collections.iter().flatten().count()
    }

    /// Live device handles in declaration order.
    pub fn device_ids(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.devices
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| DeviceId(i as u32))
    }

    pub(crate) fn device(&self, id: DeviceId) -> Result<&DeviceData, GraphError> {
        self.devices
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .ok_or(GraphError::DeviceNotFound(id))
    }

    pub(crate) fn device_mut(&mut self, id: DeviceId) -> Result<&mut DeviceData, GraphError> {
        self.devices
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(GraphError::DeviceNotFound(id))
    }

    pub(crate) fn endpoint(&self, id: EndpointId) -> Result<&EndpointData, GraphError> {
        self.endpoints
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .ok_or(GraphError::EndpointNotFound(id))
    }

    pub(crate) fn endpoint_mut(&mut self, id: EndpointId) -> Result<&mut EndpointData, GraphError> {
        self.endpoints
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(GraphError::EndpointNotFound(id))
    }

    pub(crate) fn collection(&self, id: CollectionId) -> Result<&CollectionData, GraphError> {
        self.collections
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .ok_or(GraphError::CollectionNotFound(id))
    }

    pub(crate) fn collection_mut(
        &mut self,
        id: CollectionId,
    ) -> Result<&mut CollectionData, GraphError> {
        self.collections
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(GraphError::CollectionNotFound(id))
    }
}

impl Default for Rack {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE, DEFAULT_BLOCK_SIZE)
    }
}
