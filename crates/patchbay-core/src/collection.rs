//! Flat, non-owning groupings of devices.
//!
//! A collection never owns its members: removing a collection leaves the
//! devices alone, and a device may sit in any number of collections while
//! also being nested under a parent. Membership is an ordered set.

use std::fmt;

use crate::Rack;
use crate::device::{Container, DeviceId, Members};
use crate::error::GraphError;

/// Unique identifier for a collection in a [`Rack`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionId(pub(crate) u32);

impl CollectionId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CollectionId({})", self.0)
    }
}

pub(crate) struct CollectionData {
    pub label: String,
    /// Members in insertion order, without duplicates.
    pub members: Vec<DeviceId>,
}

impl Rack {
    /// Creates an empty collection.
    pub fn add_collection(&mut self, label: impl Into<String>) -> CollectionId {
        let id = CollectionId(self.collections.len() as u32);
        self.collections.push(Some(CollectionData {
            label: label.into(),
            members: Vec::new(),
        }));
        id
    }

    /// Appends device(s) to a collection and returns the collection.
    ///
    /// Devices already present keep their position. Every device in the
    /// operand gets the collection as its container.
    pub fn collect(
        &mut self,
        collection: CollectionId,
        devices: impl Into<Members>,
    ) -> Result<CollectionId, GraphError> {
        let devices = devices.into();
        self.collection(collection)?;
        for &device in devices.as_slice() {
            self.device(device)?;
        }
        for &device in devices.as_slice() {
            let members = &mut self.collection_mut(collection)?.members;
            if !members.contains(&device) {
                members.push(device);
            }
            self.device_mut(device)?.container = Some(Container::Collection(collection));
        }
        Ok(collection)
    }

    /// Same effect as [`collect`](Self::collect) with the operands swapped.
    pub fn collect_reversed(
        &mut self,
        devices: impl Into<Members>,
        collection: CollectionId,
    ) -> Result<CollectionId, GraphError> {
        self.collect(collection, devices)
    }

    /// Unions `right` into `left`: left's members first, then the members of
    /// `right` that were not already present. Returns `left`.
    pub fn merge(
        &mut self,
        left: CollectionId,
        right: CollectionId,
    ) -> Result<CollectionId, GraphError> {
        let incoming = self.collection(right)?.members.clone();
        self.collect(left, incoming)
    }

    /// Creates a new collection holding `a` followed by `b`.
    ///
    /// Either operand may be a single device or a sequence, such as the
    /// members of an existing collection.
    pub fn group(
        &mut self,
        a: impl Into<Members>,
        b: impl Into<Members>,
    ) -> Result<CollectionId, GraphError> {
        let (a, b) = (a.into(), b.into());
        for &device in a.as_slice().iter().chain(b.as_slice()) {
            self.device(device)?;
        }
        let collection = self.add_collection("group");
        self.collect(collection, a)?;
        self.collect(collection, b)
    }

    /// Members of a collection in insertion order.
    pub fn members(&self, collection: CollectionId) -> Result<&[DeviceId], GraphError> {
        Ok(&self.collection(collection)?.members)
    }

    /// A collection's label.
    pub fn collection_label(&self, collection: CollectionId) -> Result<&str, GraphError> {
        Ok(&self.collection(collection)?.label)
    }
}
