//! End-to-end signal chains built only from patchbay-devices.
//!
//! Mirrors the demo chain: a source feeding a printer directly and through a
//! gain stage, all in one tick, plus longer chains with clipping and
//! inversion.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use patchbay_core::{GraphError, Rack};
use patchbay_devices::{
    ClipDistortion, DcSource, Gain, Inverter, LINEAR_MAX, Mono, NoiseSource, Printer, Recorder,
    dbfs_to_linear,
};

/// Cloneable in-memory writer shared by several printers.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuf {
    fn lines(&self) -> Vec<String> {
        String::from_utf8(self.0.lock().unwrap().clone())
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect()
    }
}

#[test]
fn printers_see_source_and_gain_output_in_one_tick() {
    let out = SharedBuf::default();
    let mut rack = Rack::new(44100.0, 8);

    let source = DcSource::add(&mut rack, "source", 3913).unwrap();
    let pre = Mono::add(&mut rack, "pre-printer", Printer::with_writer(out.clone(), false)).unwrap();
    let gain = Gain::add(&mut rack, "gain", -6.02).unwrap();
    let post = Mono::add(&mut rack, "post-printer", Printer::with_writer(out.clone(), false)).unwrap();

    rack.patch(source.device, pre.device).unwrap();
    rack.patch(source.device, gain.device).unwrap();
    rack.patch(gain.device, post.device).unwrap();

    let root = rack.tick_root(source.device).unwrap();
    rack.tick(root).unwrap();

    let lines = out.lines();
    assert_eq!(lines.len(), 2, "got {lines:?}");
    assert!(lines.contains(&"pre-printer: [3913, 3913, 3913, ..., 3913, 3913, 3913]".to_string()));
    assert!(lines.contains(&"post-printer: [1956, 1956, 1956, ..., 1956, 1956, 1956]".to_string()));
}

#[test]
fn demo_chain_clips_and_inverts() -> Result<(), GraphError> {
    let mut rack = Rack::new(44100.0, 64);
    let noise = NoiseSource::add(&mut rack, "source", LINEAR_MAX, 42)?;
    let gain = Gain::add(&mut rack, "gain", -6.02)?;
    let clip = ClipDistortion::add(&mut rack, "clip", -12.0)?;
    let inverter = Inverter::add(&mut rack, "inverter")?;
    let (rec, tape) = Recorder::add(&mut rack, "rec", 64 * 4)?;

    rack.patch(noise.device, gain.device)?;
    rack.patch(gain.device, clip.device)?;
    rack.patch(clip.device, inverter.device)?;
    rack.patch(inverter.device, rec.device)?;

    let root = rack.tick_root(noise.device)?;
    assert_eq!(
        rack.schedule(root)?,
        vec![noise.device, gain.device, clip.device, inverter.device, rec.device]
    );
    for _ in 0..4 {
        rack.tick(root)?;
    }

    let limit = dbfs_to_linear(-12.0) as i32;
    let captured = tape.take();
    assert_eq!(captured.len(), 256);
    assert!(captured.iter().all(|&s| s.abs() <= limit));
    // Full-scale noise halved still exceeds -12 dBFS often enough to clip.
    assert!(captured.iter().any(|&s| s.abs() == limit));
    Ok(())
}

#[test]
fn patching_a_mixer_is_ambiguous() {
    let mut rack = Rack::new(44100.0, 8);
    let src = DcSource::add(&mut rack, "src", 1).unwrap();
    let mix = patchbay_devices::Mixer::add(&mut rack, "mix", 2);
    let err = rack.patch(src.device, mix).unwrap_err();
    assert!(matches!(err, GraphError::AmbiguousPort { count: 2, .. }));
    assert_eq!(rack.edge_count(), 0);
}
