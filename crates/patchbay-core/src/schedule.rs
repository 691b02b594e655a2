//! Tick scheduling: one deterministic propagation pass over a device graph.
//!
//! A tick runs in four steps:
//!
//! 1. **Discover** every leaf reachable from the root through subdevice
//!    containment (for a collection, the union over its members).
//! 2. **Order** the leaves with Kahn's algorithm on the relation "an Output of
//!    A is connected to an Input of B". Ready leaves are taken in declaration
//!    order, so the schedule is a pure function of the graph.
//! 3. **Detect cycles.** A leaf left with unresolved dependencies fails the
//!    tick with [`GraphError::GraphCycle`] before any buffer is touched.
//! 4. **Execute** each leaf once: clear all Input slots, then for every leaf in
//!    order gather its Inputs (silence where nothing arrived), run its
//!    processor, store its Outputs and hand each one to every connected Input.
//!
//! Composite devices only group leaves; their own endpoints are not scheduled.
//! When several Outputs feed one Input, the one that runs last wins.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashSet};

use crate::Rack;
use crate::buffer::SampleBuffer;
use crate::collection::CollectionId;
use crate::device::{DeviceData, DeviceId};
use crate::endpoint::{EndpointId, deliver, slot_mut};
use crate::error::GraphError;
use crate::process::ProcessContext;

/// What a tick starts from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Root {
    /// A device and everything nested under it.
    Device(DeviceId),
    /// Every member of a collection and everything nested under them.
    Collection(CollectionId),
}

impl From<DeviceId> for Root {
    fn from(device: DeviceId) -> Self {
        Self::Device(device)
    }
}

impl From<CollectionId> for Root {
    fn from(collection: CollectionId) -> Self {
        Self::Collection(collection)
    }
}

impl Rack {
    /// Computes the execution order of the leaves under `root` without
    /// running anything.
    pub fn schedule(&self, root: impl Into<Root>) -> Result<Vec<DeviceId>, GraphError> {
        let leaves = self.discover(root.into())?;
        self.order(&leaves)
    }

    /// Propagates one block through every leaf under `root`, each exactly once.
    ///
    /// A processor error stops the tick; devices that already ran keep the
    /// data they produced.
    pub fn tick(&mut self, root: impl Into<Root>) -> Result<(), GraphError> {
        let order = self.schedule(root)?;

        #[cfg(feature = "tracing")]
        {
            tracing::debug!("tick: order {order:?}");
            self.warn_fan_in(&order);
        }

        for &device in &order {
            let inputs: Vec<EndpointId> =
                self.device(device)?.inputs.iter().map(|(_, id)| *id).collect();
            for input in inputs {
                self.endpoint_mut(input)?.buffer = None;
            }
        }

        for &device in &order {
            #[cfg(feature = "tracing")]
            tracing::trace!("tick: processing {device}");
            self.run_device(device)?;
        }
        Ok(())
    }

    fn discover(&self, root: Root) -> Result<BTreeSet<DeviceId>, GraphError> {
        let mut stack = match root {
            Root::Device(device) => vec![device],
            Root::Collection(collection) => self.collection(collection)?.members.clone(),
        };
        let mut seen = HashSet::new();
        let mut leaves = BTreeSet::new();
        while let Some(device) = stack.pop() {
            if !seen.insert(device) {
                continue;
            }
            let data = self.device(device)?;
            if data.subdevices.is_empty() {
                leaves.insert(device);
            } else {
                stack.extend(data.subdevices.iter().copied());
            }
        }
        Ok(leaves)
    }

    /// Kahn's algorithm over the discovered leaves.
    fn order(&self, leaves: &BTreeSet<DeviceId>) -> Result<Vec<DeviceId>, GraphError> {
        let mut in_degree: BTreeMap<DeviceId, usize> = leaves.iter().map(|&d| (d, 0)).collect();
        let mut successors: BTreeMap<DeviceId, Vec<DeviceId>> = BTreeMap::new();

        for &leaf in leaves {
            for (_, output) in &self.device(leaf)?.outputs {
                for &peer in &self.endpoint(*output)?.peers {
                    let target = self.endpoint(peer)?.owner;
                    if let Some(count) = in_degree.get_mut(&target) {
                        *count += 1;
                        successors.entry(leaf).or_default().push(target);
                    }
                }
            }
        }

        let mut ready: BinaryHeap<Reverse<DeviceId>> = in_degree
            .iter()
            .filter(|&(_, &count)| count == 0)
            .map(|(&device, _)| Reverse(device))
            .collect();
        let mut sorted = Vec::with_capacity(leaves.len());

        while let Some(Reverse(device)) = ready.pop() {
            sorted.push(device);
            for next in successors.get(&device).into_iter().flatten() {
                if let Some(count) = in_degree.get_mut(next) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push(Reverse(*next));
                    }
                }
            }
        }

        if sorted.len() != leaves.len() {
            // Leftovers are on a cycle or downstream of one; name only the former.
            let stuck: BTreeSet<DeviceId> = in_degree
                .iter()
                .filter(|&(_, &count)| count > 0)
                .map(|(&device, _)| device)
                .collect();
            let devices = stuck
                .iter()
                .filter(|&&device| reaches_itself(device, &successors, &stuck))
                .map(|&device| self.label(device).map(str::to_owned))
                .collect::<Result<Vec<_>, _>>()?;
            return Err(GraphError::GraphCycle { devices });
        }
        Ok(sorted)
    }

    fn run_device(&mut self, device: DeviceId) -> Result<(), GraphError> {
        let Self {
            devices,
            endpoints,
            block_size,
            sample_rate,
            ..
        } = self;
        let DeviceData {
            label,
            inputs,
            outputs,
            processor,
            ..
        } = devices
            .get_mut(device.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(GraphError::DeviceNotFound(device))?;
        let Some(processor) = processor.as_mut() else {
            return Ok(());
        };

        let mut gathered = Vec::with_capacity(inputs.len());
        for (name, id) in inputs.iter() {
            let buffer = slot_mut(endpoints, *id)?
                .buffer
                .clone()
                .unwrap_or_else(|| SampleBuffer::silence(*block_size));
            gathered.push((name.as_str(), buffer));
        }

        let label: &str = label;
        let mut ctx = ProcessContext::new(
            label,
            device,
            *block_size,
            *sample_rate,
            gathered,
            outputs.iter().map(|(name, id)| (name.as_str(), *id)),
        );
        processor
            .process(&mut ctx)
            .map_err(|source| GraphError::Process {
                device: label.to_string(),
                source,
            })?;

        for (output, produced) in ctx.into_outputs() {
            slot_mut(endpoints, output)?.buffer = produced;
            deliver(endpoints, output)?;
        }
        Ok(())
    }

    #[cfg(feature = "tracing")]
    fn warn_fan_in(&self, order: &[DeviceId]) {
        for (device, input, feeders) in self.fan_in(order) {
            let (Ok(label), Ok(name)) = (self.label(device), self.endpoint_name(input)) else {
                continue;
            };
            tracing::warn!(
                "'{label}.{name}' is fed by {feeders} outputs, only the last one to run is kept"
            );
        }
    }

    /// Inputs of scheduled leaves fed by more than one scheduled Output, with
    /// the number of such Outputs.
    #[cfg(any(test, feature = "tracing"))]
    fn fan_in(&self, order: &[DeviceId]) -> Vec<(DeviceId, EndpointId, usize)> {
        let scheduled: HashSet<DeviceId> = order.iter().copied().collect();
        let mut found = Vec::new();
        for &device in order {
            let Ok(data) = self.device(device) else {
                continue;
            };
            for &(_, input) in &data.inputs {
                let Ok(endpoint) = self.endpoint(input) else {
                    continue;
                };
                let feeders = endpoint
                    .peers
                    .iter()
                    .filter(|&&peer| {
                        self.endpoint(peer)
                            .is_ok_and(|p| scheduled.contains(&p.owner))
                    })
                    .count();
                if feeders > 1 {
                    found.push((device, input, feeders));
                }
            }
        }
        found
    }
}

/// Returns `true` if a path through `within` leads from `start` back to it.
fn reaches_itself(
    start: DeviceId,
    successors: &BTreeMap<DeviceId, Vec<DeviceId>>,
    within: &BTreeSet<DeviceId>,
) -> bool {
    let mut seen = HashSet::new();
    let mut stack = vec![start];
    while let Some(device) = stack.pop() {
        for &next in successors.get(&device).into_iter().flatten() {
            if next == start {
                return true;
            }
            if within.contains(&next) && seen.insert(next) {
                stack.push(next);
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::process::{Ports, Process};

    struct Const(i32);

    impl Process for Const {
        fn ports(&self) -> Ports {
            Ports::source()
        }

        fn process(&mut self, ctx: &mut ProcessContext<'_>) -> Result<(), BoxError> {
            ctx.set_sole_output(SampleBuffer::filled(ctx.block_size(), self.0))?;
            Ok(())
        }
    }

    struct AddOne;

    impl Process for AddOne {
        fn ports(&self) -> Ports {
            Ports::mono()
        }

        fn process(&mut self, ctx: &mut ProcessContext<'_>) -> Result<(), BoxError> {
            let out = ctx.sole_input()?.map(|s| s + 1);
            ctx.set_sole_output(out)?;
            Ok(())
        }
    }

    fn io(rack: &Rack, device: DeviceId) -> (EndpointId, EndpointId) {
        (
            rack.input(device, "input").unwrap(),
            rack.output(device, "output").unwrap(),
        )
    }

    #[test]
    fn order_follows_edges_not_declaration() {
        let mut rack = Rack::new(44100.0, 4);
        let top = rack.add_device("top");
        let b = rack.add_leaf("b", AddOne);
        let a = rack.add_leaf("a", AddOne);
        let src = rack.add_leaf("src", Const(1));
        rack.add_subdevice(top, [b, a, src]).unwrap();

        let (b_in, _) = io(&rack, b);
        let (a_in, a_out) = io(&rack, a);
        rack.connect(rack.output(src, "output").unwrap(), a_in).unwrap();
        rack.connect(a_out, b_in).unwrap();

        assert_eq!(rack.schedule(top).unwrap(), vec![src, a, b]);
    }

    #[test]
    fn independent_leaves_in_declaration_order() {
        let mut rack = Rack::new(44100.0, 4);
        let top = rack.add_device("top");
        let x = rack.add_leaf("x", Const(1));
        let y = rack.add_leaf("y", Const(2));
        let z = rack.add_leaf("z", Const(3));
        rack.add_subdevice(top, [z, x, y]).unwrap();
        assert_eq!(rack.schedule(top).unwrap(), vec![x, y, z]);
    }

    #[test]
    fn tick_propagates_through_chain() {
        let mut rack = Rack::new(44100.0, 4);
        let src = rack.add_leaf("src", Const(10));
        let inc = rack.add_leaf("inc", AddOne);
        let coll = rack.group(src, inc).unwrap();
        let (inc_in, inc_out) = io(&rack, inc);
        rack.connect(rack.output(src, "output").unwrap(), inc_in).unwrap();

        rack.tick(coll).unwrap();
        assert_eq!(rack.buffer(inc_out).unwrap().unwrap().as_slice(), &[11; 4]);
    }

    #[test]
    fn undelivered_input_reads_silence() {
        let mut rack = Rack::new(44100.0, 3);
        let inc = rack.add_leaf("inc", AddOne);
        rack.tick(inc).unwrap();
        let (_, out) = io(&rack, inc);
        assert_eq!(rack.buffer(out).unwrap().unwrap().as_slice(), &[1, 1, 1]);
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let mut rack = Rack::new(44100.0, 4);
        let inc = rack.add_leaf("inc", AddOne);
        let (inp, out) = io(&rack, inc);
        rack.connect(out, inp).unwrap();
        let err = rack.tick(inc).unwrap_err();
        assert!(matches!(err, GraphError::GraphCycle { ref devices } if devices == &["inc"]));
    }

    #[test]
    fn cycle_report_skips_devices_only_downstream() {
        let mut rack = Rack::new(44100.0, 4);
        let top = rack.add_device("top");
        let x = rack.add_leaf("x", AddOne);
        let y = rack.add_leaf("y", AddOne);
        let z = rack.add_leaf("z", AddOne);
        let p = rack.add_leaf("p", AddOne);
        let q = rack.add_leaf("q", AddOne);
        let tail = rack.add_leaf("tail", AddOne);
        rack.add_subdevice(top, [x, y, z, p, q, tail]).unwrap();

        // x <-> y -> z -> p <-> q -> tail
        for (from, to) in [(x, y), (y, x), (y, z), (z, p), (p, q), (q, p), (q, tail)] {
            let (_, out) = io(&rack, from);
            let (inp, _) = io(&rack, to);
            rack.connect(out, inp).unwrap();
        }

        match rack.schedule(top).unwrap_err() {
            GraphError::GraphCycle { devices } => assert_eq!(devices, ["x", "y", "p", "q"]),
            other => panic!("expected a cycle, got {other:?}"),
        }
    }

    #[test]
    fn fan_in_counts_only_scheduled_feeders() {
        let mut rack = Rack::new(44100.0, 4);
        let a = rack.add_leaf("a", Const(1));
        let b = rack.add_leaf("b", Const(2));
        let outside = rack.add_leaf("outside", Const(3));
        let sink = rack.add_leaf("sink", AddOne);
        let (sink_in, _) = io(&rack, sink);
        rack.connect(rack.output(a, "output").unwrap(), sink_in).unwrap();
        rack.connect(rack.output(outside, "output").unwrap(), sink_in).unwrap();

        let pair = rack.group(a, sink).unwrap();
        let order = rack.schedule(pair).unwrap();
        assert!(rack.fan_in(&order).is_empty());

        rack.connect(rack.output(b, "output").unwrap(), sink_in).unwrap();
        rack.collect(pair, b).unwrap();
        let order = rack.schedule(pair).unwrap();
        assert_eq!(rack.fan_in(&order), vec![(sink, sink_in, 2)]);
    }

    #[test]
    fn inert_leaf_produces_nothing() {
        let mut rack = Rack::new(44100.0, 4);
        let inert = rack.add_device("inert");
        let out = rack.add_output(inert, "out").unwrap();
        rack.tick(inert).unwrap();
        assert!(rack.buffer(out).unwrap().is_none());
    }

    #[test]
    fn unknown_root_rejected() {
        let mut rack = Rack::new(44100.0, 4);
        assert!(matches!(
            rack.tick(DeviceId(3)),
            Err(GraphError::DeviceNotFound(_))
        ));
        assert!(matches!(
            rack.tick(CollectionId(0)),
            Err(GraphError::CollectionNotFound(_))
        ));
    }
}
