//! Criterion benchmarks for the patchbay tick scheduler.
//!
//! Measures graph overhead independently of signal math using a trivial
//! pass-through processor. Two axes:
//!
//! - **Schedule** - discovery plus Kahn ordering
//! - **Tick** - full propagation at varying block sizes
//!
//! Run with: `cargo bench -p patchbay-core`
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use patchbay_core::{BoxError, DeviceId, Ports, Process, ProcessContext, Rack, SampleBuffer};

const SAMPLE_RATE: f32 = 44100.0;
const BLOCK_SIZE: usize = 64;
const BLOCK_SIZES: &[usize] = &[16, 64, 256, 1024];

// ---------------------------------------------------------------------------
// Trivial processors
// ---------------------------------------------------------------------------

struct Ramp;

impl Process for Ramp {
    fn ports(&self) -> Ports {
        Ports::source()
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>) -> Result<(), BoxError> {
        let block: SampleBuffer = (0..ctx.block_size() as i32).collect();
        ctx.set_sole_output(block)?;
        Ok(())
    }
}

/// Hands its input to the output without copying.
struct Thru;

impl Process for Thru {
    fn ports(&self) -> Ports {
        Ports::mono()
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>) -> Result<(), BoxError> {
        let block = ctx.sole_input()?.clone();
        ctx.set_sole_output(block)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Rack constructors
// ---------------------------------------------------------------------------

fn make_chain(n: usize, block_size: usize) -> (Rack, DeviceId) {
    let mut rack = Rack::new(SAMPLE_RATE, block_size);
    let top = rack.add_device("top");
    let mut prev = rack.add_leaf("ramp", Ramp);
    rack.add_subdevice(top, prev).unwrap();
    for i in 0..n {
        let next = rack.add_leaf(format!("thru{i}"), Thru);
        rack.add_subdevice(top, next).unwrap();
        let out = rack.output(prev, "output").unwrap();
        let inp = rack.input(next, "input").unwrap();
        rack.connect_forward(out, inp).unwrap();
        prev = next;
    }
    (rack, top)
}

fn make_fan_out(width: usize) -> (Rack, DeviceId) {
    let mut rack = Rack::new(SAMPLE_RATE, BLOCK_SIZE);
    let top = rack.add_device("top");
    let src = rack.add_leaf("ramp", Ramp);
    rack.add_subdevice(top, src).unwrap();
    let out = rack.output(src, "output").unwrap();
    for i in 0..width {
        let branch = rack.add_leaf(format!("branch{i}"), Thru);
        rack.add_subdevice(top, branch).unwrap();
        let inp = rack.input(branch, "input").unwrap();
        rack.connect_forward(out, inp).unwrap();
    }
    (rack, top)
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_schedule(c: &mut Criterion) {
    let mut group = c.benchmark_group("rack/schedule");
    for &n in &[5usize, 20, 100] {
        let (rack, top) = make_chain(n, BLOCK_SIZE);
        group.bench_with_input(BenchmarkId::new("chain", n), &n, |b, _| {
            b.iter(|| black_box(rack.schedule(black_box(top)).unwrap()));
        });
    }
    group.finish();
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("rack/tick");

    {
        let (mut rack, top) = make_chain(20, BLOCK_SIZE);
        group.bench_function("chain_20", |b| {
            b.iter(|| rack.tick(black_box(top)).unwrap());
        });
    }

    {
        let (mut rack, top) = make_fan_out(16);
        group.bench_function("fan_out_16", |b| {
            b.iter(|| rack.tick(black_box(top)).unwrap());
        });
    }

    for &block_size in BLOCK_SIZES {
        let (mut rack, top) = make_chain(5, block_size);
        group.bench_with_input(
            BenchmarkId::new("chain_5_block", block_size),
            &block_size,
            |b, _| {
                b.iter(|| rack.tick(black_box(top)).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_schedule, bench_tick);
criterion_main!(benches);
