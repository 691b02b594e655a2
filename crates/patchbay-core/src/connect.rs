//! Connection algebra over endpoints.
//!
//! Every connection operation returns its right-hand operand so calls can be
//! chained left to right; [`Wire`] packages that chaining as a builder:
//!
//! ```rust
//! use patchbay_core::Rack;
//!
//! let mut rack = Rack::new(44100.0, 64);
//! let a = rack.add_device("a");
//! let b = rack.add_device("b");
//! let c = rack.add_device("c");
//! let a_out = rack.add_output(a, "out")?;
//! let b_in = rack.add_input(b, "in")?;
//! let c_out = rack.add_output(c, "out")?;
//!
//! // a_out -> b_in -- c_out
//! let last = rack.wire(a_out).forward(b_in)?.connect(c_out)?.end();
//! assert_eq!(last, c_out);
//! assert!(rack.is_connected(b_in, c_out)?);
//! # Ok::<(), patchbay_core::GraphError>(())
//! ```
//!
//! Rules:
//!
//! - an edge always joins an Output to an Input;
//! - [`connect_forward`](Rack::connect_forward) needs an Input on the right,
//!   [`connect_backward`](Rack::connect_backward) an Input on the left;
//! - connecting an already-connected pair is a no-op;
//! - a failed call creates no edge.

use crate::Rack;
use crate::collection::CollectionId;
use crate::device::{Container, DeviceId};
use crate::endpoint::{EndpointId, Role};
use crate::error::GraphError;

/// Unary form of the connection operator: returns the endpoint unchanged.
#[inline]
pub const fn identity(endpoint: EndpointId) -> EndpointId {
    endpoint
}

impl Rack {
    /// Connects two endpoints regardless of which side is the Input.
    ///
    /// Returns `right`. Fails with [`GraphError::RoleMismatch`] if both
    /// endpoints have the same role.
    pub fn connect(
        &mut self,
        left: EndpointId,
        right: EndpointId,
    ) -> Result<EndpointId, GraphError> {
        self.link(left, right)?;
        Ok(right)
    }

    /// Connects `left` into `right`, which must be an Input.
    ///
    /// Returns `right`.
    pub fn connect_forward(
        &mut self,
        left: EndpointId,
        right: EndpointId,
    ) -> Result<EndpointId, GraphError> {
        if self.endpoint(right)?.role != Role::Input {
            return Err(GraphError::RoleMismatch {
                left,
                right,
                reason: "a forward connection must point into an input",
            });
        }
        self.link(left, right)?;
        Ok(right)
    }

    /// Connects `right` into `left`, which must be an Input.
    ///
    /// Still returns `right`, so forward and backward links chain the same way.
    pub fn connect_backward(
        &mut self,
        left: EndpointId,
        right: EndpointId,
    ) -> Result<EndpointId, GraphError> {
        if self.endpoint(left)?.role != Role::Input {
            return Err(GraphError::RoleMismatch {
                left,
                right,
                reason: "a backward connection must point into an input on the left",
            });
        }
        self.link(left, right)?;
        Ok(right)
    }

    /// Removes every edge touching `endpoint`.
    ///
    /// Calling this on an unconnected endpoint does nothing. Returns the
    /// endpoint so it can be rewired in the same chain.
    pub fn disconnect(&mut self, endpoint: EndpointId) -> Result<EndpointId, GraphError> {
        let peers = std::mem::take(&mut self.endpoint_mut(endpoint)?.peers);
        for peer in &peers {
            if let Ok(data) = self.endpoint_mut(*peer) {
                data.peers.retain(|p| *p != endpoint);
            }
        }
        #[cfg(feature = "tracing")]
        if !peers.is_empty() {
            tracing::debug!("disconnect: {endpoint} from {} peers", peers.len());
        }
        Ok(endpoint)
    }

    /// Returns `true` if an edge joins `a` and `b`.
    pub fn is_connected(&self, a: EndpointId, b: EndpointId) -> Result<bool, GraphError> {
        self.endpoint(b)?;
        Ok(self.endpoint(a)?.peers.contains(&b))
    }

    /// Returns `true` if `endpoint` has no edges.
    pub fn is_disconnected(&self, endpoint: EndpointId) -> Result<bool, GraphError> {
        Ok(self.endpoint(endpoint)?.peers.is_empty())
    }

    /// Total number of edges in the rack.
    pub fn edge_count(&self) -> usize {
        self.endpoints
            .iter()
            .flatten()
            .filter(|e| e.role == Role::Output)
            .map(|e| e.peers.len())
            .sum()
    }

    /// Starts a connection chain at `start`.
    pub fn wire(&mut self, start: EndpointId) -> Wire<'_> {
        Wire {
            rack: self,
            head: start,
        }
    }

    /// Patches two single-channel devices together.
    ///
    /// Connects the only Output of `from` to the only Input of `to`, then
    /// gathers both into a shared container collection: the one `from` already
    /// sits in, else the one `to` sits in, else a new collection. When both
    /// already sit in different collections, the members of `to`'s collection
    /// are merged into `from`'s and take it as their container. Returns `to`.
    ///
    /// The shared collection is what [`tick_root`](Rack::tick_root) finds, so
    /// a chain built only from `patch` calls can be ticked from any of its
    /// devices.
    pub fn patch(&mut self, from: DeviceId, to: DeviceId) -> Result<DeviceId, GraphError> {
        let output = self.sole_port(from, Role::Output)?;
        let input = self.sole_port(to, Role::Input)?;
        self.connect_forward(output, input)?;

        let shared = match (self.collection_container(from)?, self.collection_container(to)?) {
            (Some(left), Some(right)) if left != right => self.merge(left, right)?,
            (Some(c), _) | (None, Some(c)) => c,
            (None, None) => self.add_collection("container"),
        };
        for device in [from, to] {
            if self.collection_container(device)?.is_none() {
                self.collect(shared, device)?;
            }
        }
        Ok(to)
    }

    fn collection_container(&self, device: DeviceId) -> Result<Option<CollectionId>, GraphError> {
        Ok(match self.device(device)?.container {
            Some(Container::Collection(c)) => Some(c),
            _ => None,
        })
    }

    fn sole_port(&self, device: DeviceId, role: Role) -> Result<EndpointId, GraphError> {
        let ports = self.ports(device, role)?;
        match ports {
            [(_, id)] => Ok(*id),
            _ => Err(GraphError::AmbiguousPort {
                device,
                role,
                count: ports.len(),
            }),
        }
    }

    /// Adds the edge `left`–`right` after checking the role invariant.
    fn link(&mut self, left: EndpointId, right: EndpointId) -> Result<(), GraphError> {
        let left_role = self.endpoint(left)?.role;
        let right_role = self.endpoint(right)?.role;
        let reason = match (left_role, right_role) {
            (Role::Output, Role::Input) | (Role::Input, Role::Output) => None,
            (Role::Output, Role::Output) => Some("both endpoints are outputs"),
            (Role::Input, Role::Input) => Some("both endpoints are inputs"),
        };
        if let Some(reason) = reason {
            return Err(GraphError::RoleMismatch {
                left,
                right,
                reason,
            });
        }

        if self.endpoint(left)?.peers.contains(&right) {
            return Ok(());
        }
        self.endpoint_mut(left)?.peers.push(right);
        self.endpoint_mut(right)?.peers.push(left);

        #[cfg(feature = "tracing")]
        tracing::debug!("connect: {left} <-> {right}");
        Ok(())
    }
}

/// Left-to-right connection chain started by [`Rack::wire`].
///
/// Each step connects the current head to the next endpoint and makes that
/// endpoint the new head, exactly like chaining the named operations by hand.
pub struct Wire<'r> {
    rack: &'r mut Rack,
    head: EndpointId,
}

impl Wire<'_> {
    /// Undirected step, see [`Rack::connect`].
    pub fn connect(self, next: EndpointId) -> Result<Self, GraphError> {
        let head = self.rack.connect(self.head, next)?;
        Ok(Self {
            rack: self.rack,
            head,
        })
    }

    /// Forward step, see [`Rack::connect_forward`].
    pub fn forward(self, next: EndpointId) -> Result<Self, GraphError> {
        let head = self.rack.connect_forward(self.head, next)?;
        Ok(Self {
            rack: self.rack,
            head,
        })
    }

    /// Backward step, see [`Rack::connect_backward`].
    pub fn backward(self, next: EndpointId) -> Result<Self, GraphError> {
        let head = self.rack.connect_backward(self.head, next)?;
        Ok(Self {
            rack: self.rack,
            head,
        })
    }

    /// Unlinks the head from everything, keeping it as the head.
    pub fn disconnect(self) -> Result<Self, GraphError> {
        self.rack.disconnect(self.head)?;
        Ok(self)
    }

    /// Current head of the chain.
    pub fn head(&self) -> EndpointId {
        self.head
    }

    /// Ends the chain, returning the last right-hand operand.
    pub fn end(self) -> EndpointId {
        self.head
    }
}
