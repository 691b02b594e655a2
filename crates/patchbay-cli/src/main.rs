//! Patchbay CLI - run and inspect patchbay racks from the command line.

mod chain;
mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "patchbay")]
#[command(author, version, about = "Patchbay signal-flow graph CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the demo chain: noise through gain, clipping and inversion
    Demo(commands::demo::DemoArgs),

    /// Print the demo rack's device tree and tick order
    Tree(commands::tree::TreeArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so printer output on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo(args) => commands::demo::run(args),
        Commands::Tree(args) => commands::tree::run(args),
    }
}
