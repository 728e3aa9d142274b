use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use divsim_agg::reduce_stream_path;

use super::persist_results;

#[derive(Args, Debug)]
pub struct ReduceArgs {
    /// Map file written by `divsim sweep`.
    #[arg(long)]
    pub maps: PathBuf,
    /// Rows per batch; must be a multiple of the neighbourhoods per replication.
    #[arg(long)]
    pub batch_size: usize,
    /// Output directory for `indices.csv` and `global.csv`.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &ReduceArgs) -> Result<(), Box<dyn Error>> {
    let mut results = reduce_stream_path(&args.maps, args.batch_size)?;
    results.sort_canonical();
    persist_results(&args.out, &results)
}
