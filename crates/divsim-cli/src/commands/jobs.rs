use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use divsim_agg::{reduce_by_job, JobTable};

use super::persist_results;

#[derive(Args, Debug)]
pub struct ReduceJobsArgs {
    /// Map file carrying `vacr`, `city` and `job` columns.
    #[arg(long)]
    pub input: PathBuf,
    /// Output directory for `indices.csv` and `global.csv`.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &ReduceJobsArgs) -> Result<(), Box<dyn Error>> {
    let table = JobTable::from_path(&args.input)?;
    let results = reduce_by_job(&table)?;
    persist_results(&args.out, &results)
}
