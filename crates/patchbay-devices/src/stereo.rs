//! Stereo composites built from two mono devices.

use patchbay_core::{DeviceId, GraphError, Rack};

use crate::handle::Handle;

/// A parent device owning a `left` and a `right` channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stereo<H> {
    /// The composite parent.
    pub device: DeviceId,
    /// Left channel.
    pub left: H,
    /// Right channel.
    pub right: H,
}

impl<H> Handle for Stereo<H> {
    fn device(&self) -> DeviceId {
        self.device
    }
}

/// Builds a stereo pair by calling `make` once per channel.
///
/// The channels are labelled `{label}-left` and `{label}-right` and nested, in
/// that order, under a new parent labelled `label`.
///
/// ```rust
/// use patchbay_core::Rack;
/// use patchbay_devices::{Gain, stereo};
///
/// let mut rack = Rack::new(44100.0, 64);
/// let pair = stereo(&mut rack, "gain", |rack, label| Gain::add(rack, label, -3.0))?;
/// assert_eq!(rack.subdevices(pair.device)?, &[pair.left.device, pair.right.device]);
/// assert_eq!(rack.label(pair.right.device)?, "gain-right");
/// # Ok::<(), patchbay_core::GraphError>(())
/// ```
pub fn stereo<H: Handle>(
    rack: &mut Rack,
    label: &str,
    mut make: impl FnMut(&mut Rack, String) -> Result<H, GraphError>,
) -> Result<Stereo<H>, GraphError> {
    let left = make(rack, format!("{label}-left"))?;
    let right = make(rack, format!("{label}-right"))?;
    let device = rack.add_device(label);
    rack.add_subdevice(device, [left.device(), right.device()])?;
    Ok(Stereo {
        device,
        left,
        right,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DcSource, Inverter};
    use patchbay_core::Root;

    #[test]
    fn channels_run_independently() {
        let mut rack = Rack::new(44100.0, 4);
        let src = stereo(&mut rack, "dc", |rack, label| DcSource::add(rack, label, 5)).unwrap();
        let inv = stereo(&mut rack, "inv", |rack, label| Inverter::add(rack, label)).unwrap();
        rack.connect(src.left.output, inv.left.input).unwrap();

        let top = rack.add_device("top");
        rack.add_subdevice(top, [src.device, inv.device]).unwrap();
        rack.tick(top).unwrap();

        assert_eq!(rack.buffer(inv.left.output).unwrap().unwrap().as_slice(), &[-5; 4]);
        // nothing feeds the right inverter, so it inverts silence
        assert_eq!(rack.buffer(inv.right.output).unwrap().unwrap().as_slice(), &[0; 4]);
    }

    #[test]
    fn parent_is_a_composite() {
        let mut rack = Rack::new(44100.0, 4);
        let pair = stereo(&mut rack, "pair", |rack, label| Ok(rack.add_device(label))).unwrap();
        assert!(!rack.is_leaf(pair.device).unwrap());
        assert_eq!(rack.parent(pair.left).unwrap(), Some(pair.device));
        assert_eq!(rack.tick_root(pair.right).unwrap(), Root::Device(pair.device));
    }
}
