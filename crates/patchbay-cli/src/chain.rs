//! The demo rack: a noise source printed before and after a gain, clip and
//! inverter chain.

use std::io::Write;

use patchbay_config::RackConfig;
use patchbay_core::{Rack, Root, Sample};
use patchbay_devices::{ClipDistortion, Gain, Inverter, Mono, NoiseSource, Printer};

/// Parameters of the demo chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemoSettings {
    /// Peak level of the noise source.
    pub level: Sample,
    /// Noise seed.
    pub seed: u32,
    /// Gain stage in dB.
    pub gain_db: f64,
    /// Clipping threshold in dBFS.
    pub clip_dbfs: f64,
    /// Suppress printer output.
    pub bypass_printers: bool,
}

/// A built demo rack and the handles the commands need.
pub struct DemoRack {
    pub rack: Rack,
    pub root: Root,
    pub pre_printer: Mono,
    pub post_printer: Mono,
}

/// Builds `source -> pre-printer` and
/// `source -> gain -> clip -> inverter -> post-printer`.
///
/// `writer` is called once per printer.
pub fn build_demo_rack(
    config: &RackConfig,
    settings: &DemoSettings,
    mut writer: impl FnMut() -> Box<dyn Write + Send>,
) -> anyhow::Result<DemoRack> {
    let mut rack = config.build_rack()?;

    let source = NoiseSource::add(&mut rack, "source", settings.level, settings.seed)?;
    let pre_printer = Mono::add(
        &mut rack,
        "pre-printer",
        Printer::with_writer(writer(), settings.bypass_printers),
    )?;
    let gain = Gain::add(&mut rack, "gain", settings.gain_db)?;
    let clip = ClipDistortion::add(&mut rack, "clip", settings.clip_dbfs)?;
    let inverter = Inverter::add(&mut rack, "inverter")?;
    let post_printer = Mono::add(
        &mut rack,
        "post-printer",
        Printer::with_writer(writer(), settings.bypass_printers),
    )?;

    rack.patch(source.device, pre_printer.device)?;
    rack.patch(source.device, gain.device)?;
    rack.patch(gain.device, clip.device)?;
    rack.patch(clip.device, inverter.device)?;
    rack.patch(inverter.device, post_printer.device)?;

    let root = rack.tick_root(source.device)?;
    tracing::debug!(devices = rack.device_count(), ?root, "demo rack built");

    Ok(DemoRack {
        rack,
        root,
        pre_printer,
        post_printer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

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

    fn settings() -> DemoSettings {
        DemoSettings {
            level: patchbay_devices::LINEAR_MAX,
            seed: 7,
            gain_db: -6.02,
            clip_dbfs: -12.0,
            bypass_printers: false,
        }
    }

    #[test]
    fn every_device_shares_one_root() {
        let demo = build_demo_rack(&RackConfig::default(), &settings(), || Box::new(io::sink())).unwrap();
        assert!(matches!(demo.root, Root::Collection(_)));
        for device in demo.rack.device_ids() {
            assert_eq!(demo.rack.tick_root(device).unwrap(), demo.root);
        }
        assert_eq!(demo.rack.device_count(), 6);
    }

    #[test]
    fn tick_order_follows_the_chain() {
        let demo = build_demo_rack(&RackConfig::default(), &settings(), || Box::new(io::sink())).unwrap();
        let labels: Vec<_> = demo
            .rack
            .schedule(demo.root)
            .unwrap()
            .into_iter()
            .map(|d| demo.rack.label(d).unwrap().to_owned())
            .collect();
        assert_eq!(
            labels,
            ["source", "pre-printer", "gain", "clip", "inverter", "post-printer"]
        );
    }

    #[test]
    fn one_tick_prints_both_taps() {
        let out = SharedBuf::default();
        let config = RackConfig::new(44100.0, 16);
        let mut demo = build_demo_rack(&config, &settings(), || Box::new(out.clone())).unwrap();
        demo.rack.tick(demo.root).unwrap();

        let text = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2, "got {lines:?}");
        assert!(lines[0].starts_with("pre-printer: ["));
        assert!(lines[1].starts_with("post-printer: ["));

        let limit = patchbay_devices::dbfs_to_linear(-12.0) as Sample;
        let post = demo.rack.buffer(demo.post_printer.output).unwrap().unwrap();
        assert_eq!(post.len(), 16);
        assert!(post.iter().all(|s| s.abs() <= limit));
    }

    #[test]
    fn bypassed_printers_stay_silent() {
        let out = SharedBuf::default();
        let quiet = DemoSettings {
            bypass_printers: true,
            ..settings()
        };
        let mut demo = build_demo_rack(&RackConfig::default(), &quiet, || Box::new(out.clone())).unwrap();
        demo.rack.tick(demo.root).unwrap();
        assert!(out.0.lock().unwrap().is_empty());
        assert!(demo.rack.buffer(demo.pre_printer.output).unwrap().is_some());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let bad = RackConfig::new(44100.0, 0);
        assert!(build_demo_rack(&bad, &settings(), || Box::new(io::sink())).is_err());
    }
}
