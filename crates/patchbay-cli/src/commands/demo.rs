//! Run the demo signal chain.

use std::io;
use std::time::Instant;

use clap::Args;
use patchbay_core::{EndpointId, Rack};

use super::common::{ChainArgs, load_config};
use crate::chain::build_demo_rack;

/// Run the demo chain for a number of ticks.
#[derive(Args)]
pub struct DemoArgs {
    #[command(flatten)]
    pub chain: ChainArgs,

    /// Number of ticks to run (default: one second of blocks)
    #[arg(long)]
    pub ticks: Option<usize>,

    /// Bypass both printers
    #[arg(short, long)]
    pub quiet: bool,
}

/// Run the demo command.
pub fn run(args: DemoArgs) -> anyhow::Result<()> {
    let config = load_config(args.chain.config.as_deref())?;
    let settings = args.chain.settings(args.quiet);
    let mut demo = build_demo_rack(&config, &settings, || Box::new(io::stdout()))?;

    let ticks = args
        .ticks
        .unwrap_or_else(|| config.block_rate().ceil() as usize);
    tracing::info!(ticks, root = ?demo.root, "running demo chain");

    let start = Instant::now();
    for _ in 0..ticks {
        demo.rack.tick(demo.root)?;
    }
    let elapsed = start.elapsed();

    println!("Sample rate:     {} Hz", config.sample_rate);
    println!("Block size:      {} samples", config.block_size);
    println!("Block rate:      {:.0} blocks/s", config.block_rate());
    println!("Minimum latency: {:.2} ms", config.min_latency_ms());
    println!(
        "Ticks:           {ticks} in {:.3} ms",
        elapsed.as_secs_f64() * 1000.0
    );
    if let Some(peak) = peak(&demo.rack, demo.pre_printer.output)? {
        println!("Pre peak:        {peak}");
    }
    if let Some(peak) = peak(&demo.rack, demo.post_printer.output)? {
        println!("Post peak:       {peak}");
    }

    Ok(())
}

/// Largest magnitude in the last block an output held.
fn peak(rack: &Rack, output: EndpointId) -> anyhow::Result<Option<u32>> {
    Ok(rack
        .buffer(output)?
        .map(|block| block.iter().map(|s| s.unsigned_abs()).max().unwrap_or(0)))
}
