use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use divsim_agg::write_maps_path;
use divsim_exp::{load_plan, run_sweep, write_report, SweepReport, WorldWorker};
use divsim_world::SchellingFactory;
use tracing::info;

use super::persist_results;

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// YAML sweep plan.
    #[arg(long)]
    pub plan: PathBuf,
    /// Output directory for index tables, maps and the sweep report.
    #[arg(long)]
    pub out: PathBuf,
    /// Worker threads; overrides the plan's scheduler.
    #[arg(long)]
    pub threads: Option<usize>,
    /// Run replications on the calling thread.
    #[arg(long)]
    pub sequential: bool,
}

pub fn run(args: &SweepArgs) -> Result<(), Box<dyn Error>> {
    let mut plan = load_plan(&args.plan)?;
    if let Some(threads) = args.threads {
        plan.scheduler.threads = threads;
    }
    if args.sequential {
        plan.scheduler.parallel = false;
    }

    fs::create_dir_all(&args.out)?;
    let outcome = run_sweep(&plan, &WorldWorker::new(SchellingFactory))?;
    persist_results(&args.out, &outcome.results)?;
    if plan.keep_maps {
        write_maps_path(&args.out.join("maps.csv"), &outcome.maps)?;
    }

    let report = SweepReport::new(&plan, &outcome)?;
    write_report(&args.out.join("sweep_report.json"), &report)?;
    fs::write(args.out.join("plan.yaml"), plan.to_yaml_string()?)?;
    info!(
        plan_hash = report.plan_hash.as_str(),
        cells = report.cells.len(),
        skipped = report.skipped.len(),
        "sweep persisted"
    );
    Ok(())
}
