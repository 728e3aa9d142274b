//! Aggregation of map files produced by external batch jobs.
//!
//! Job files carry `vacr`, `city` and `job` columns and may interleave rows of
//! different replications freely, so the table is loaded whole and grouped by
//! `(job, tau, rep_id)` before reduction.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use divsim_core::{DivError, ErrorInfo, MergedResults};
use divsim_index::empty_results;
use indexmap::IndexMap;
use tracing::{debug, info};

use crate::block::{reduce_block, ScenarioCache};
use crate::io::{MapReader, MapRow};

/// A job map file held in memory.
#[derive(Debug, Clone, Default)]
pub struct JobTable {
    rows: Vec<MapRow>,
}

impl JobTable {
    /// Reads every row from `source`; the job columns are required.
    pub fn from_reader<R: Read>(source: R) -> Result<Self, DivError> {
        let rows = MapReader::with_job_columns(source)?.collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rows })
    }

    /// Reads a job map file from disk.
    pub fn from_path(path: &Path) -> Result<Self, DivError> {
        let file = File::open(path).map_err(|err| {
            DivError::Io(
                ErrorInfo::new("job_open", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::from_reader(file)
    }

    /// Rows in file order.
    pub fn rows(&self) -> &[MapRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the file had no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Reduces every `(job, tau, rep_id)` partition, in first-seen order.
///
/// Within a partition the scenario key, tick count, `vacr` and `city` must
/// agree; the job metadata is copied onto each output record.
pub fn reduce_by_job(table: &JobTable) -> Result<MergedResults, DivError> {
    let mut partitions: IndexMap<(String, u64, u32), Vec<&MapRow>> = IndexMap::new();
    for row in &table.rows {
        let job = row.job.as_ref().map(|meta| meta.job.clone()).unwrap_or_default();
        partitions
            .entry((job, row.key.tau.to_bits(), row.key.rep_id))
            .or_default()
            .push(row);
    }

    let mut results = empty_results();
    let mut scenarios = ScenarioCache::default();
    for ((job, _, rep_id), rows) in &partitions {
        debug!(job = job.as_str(), rep_id, rows = rows.len(), "job partition");
        reduce_block(rows, &mut scenarios, &mut results)?;
    }
    info!(
        partitions = partitions.len(),
        rows = table.len(),
        spatial_rows = results.spatial.len(),
        "job table reduced"
    );
    Ok(results)
}
