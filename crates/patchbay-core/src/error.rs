//! Error types for wiring, composition and tick operations.

use thiserror::Error;

use crate::collection::CollectionId;
use crate::device::DeviceId;
use crate::endpoint::{EndpointId, Role};

/// Boxed error returned by leaf processors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while building or ticking a [`Rack`](crate::Rack).
///
/// Every variant except [`GraphError::Process`] is a structural error: the
/// graph was configured in a way the core refuses. None of them is recovered
/// internally.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A connection would join two endpoints of the same role, or a directed
    /// connection points the wrong way.
    #[error("cannot connect {left} to {right}: {reason}")]
    RoleMismatch {
        /// Left-hand operand of the connection.
        left: EndpointId,
        /// Right-hand operand of the connection.
        right: EndpointId,
        /// Which rule was violated.
        reason: &'static str,
    },

    /// The leaf dependency relation contains a cycle.
    #[error("dependency cycle between devices: {}", .devices.join(", "))]
    GraphCycle {
        /// Labels of the devices that lie on a cycle, in declaration order.
        devices: Vec<String>,
    },

    /// Nesting would make a device its own ancestor.
    #[error("cannot add {child} under {parent}: a device cannot contain itself")]
    OwnershipCycle {
        /// Device that would receive the subdevice.
        parent: DeviceId,
        /// Device that would be nested.
        child: DeviceId,
    },

    /// A device-level patch needs exactly one port of the given role.
    #[error("{device} has {count} {role} ports, expected exactly one")]
    AmbiguousPort {
        /// Device being patched.
        device: DeviceId,
        /// Role that was looked up.
        role: Role,
        /// Number of ports of that role.
        count: usize,
    },

    /// No endpoint of the given role and name exists on the device.
    #[error("{device} has no {role} named '{name}'")]
    PortNotFound {
        /// Device that was searched.
        device: DeviceId,
        /// Role that was searched.
        role: Role,
        /// Requested port name.
        name: String,
    },

    /// The device handle is stale or belongs to another rack.
    #[error("{0} not found")]
    DeviceNotFound(DeviceId),

    /// The endpoint handle is stale or belongs to another rack.
    #[error("{0} not found")]
    EndpointNotFound(EndpointId),

    /// The collection handle is stale or belongs to another rack.
    #[error("{0} not found")]
    CollectionNotFound(CollectionId),

    /// A leaf processor failed during a tick.
    #[error("device '{device}' failed to process: {source}")]
    Process {
        /// Label of the failing device.
        device: String,
        /// Error returned by the processor.
        #[source]
        source: BoxError,
    },
}
