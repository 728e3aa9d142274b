pub mod jobs;
pub mod reduce;
pub mod sweep;

use std::error::Error;
use std::fs;
use std::path::Path;

use divsim_agg::write_results_path;
use divsim_core::MergedResults;
use tracing::info;

/// Writes `indices.csv` and `global.csv` under `out`.
pub fn persist_results(out: &Path, results: &MergedResults) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(out)?;
    write_results_path(&out.join("indices.csv"), &results.spatial)?;
    write_results_path(&out.join("global.csv"), &results.global)?;
    info!(
        out = %out.display(),
        spatial = results.spatial.len(),
        global = results.global.len(),
        "results written"
    );
    Ok(())
}
