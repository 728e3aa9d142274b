use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    jobs::{self, ReduceJobsArgs},
    reduce::{self, ReduceArgs},
    sweep::{self, SweepArgs},
};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "divsim", about = "Segregation sweep and diversity index CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a tolerance by scenario sweep from a YAML plan.
    Sweep(SweepArgs),
    /// Reduce a stored map file in fixed-size batches.
    Reduce(ReduceArgs),
    /// Reduce an external job map file partitioned by job, tau and replication.
    ReduceJobs(ReduceJobsArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Sweep(args) => sweep::run(&args),
        Command::Reduce(args) => reduce::run(&args),
        Command::ReduceJobs(args) => jobs::run(&args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
