//! Print the demo rack's structure.

use std::io;

use clap::Args;

use super::common::{ChainArgs, load_config};
use crate::chain::build_demo_rack;

/// Print the device tree and tick order.
#[derive(Args)]
pub struct TreeArgs {
    #[command(flatten)]
    pub chain: ChainArgs,
}

/// Run the tree command.
pub fn run(args: TreeArgs) -> anyhow::Result<()> {
    let config = load_config(args.chain.config.as_deref())?;
    let demo = build_demo_rack(&config, &args.chain.settings(true), || Box::new(io::sink()))?;

    print!("{}", demo.rack.tree(demo.root)?);

    println!();
    println!("Tick order:");
    for (i, device) in demo.rack.schedule(demo.root)?.into_iter().enumerate() {
        println!("  {:>2}. {}", i + 1, demo.rack.label(device)?);
    }

    Ok(())
}
