use std::fs;
use std::path::Path;

use chrono::Utc;
use divsim_core::errors::ErrorInfo;
use divsim_core::DivError;
use serde::{Deserialize, Serialize};

use crate::plan::SweepPlan;
use crate::serde::to_canonical_json_bytes;
use crate::sweep::{CellSummary, SkippedCell, SweepOutcome};

/// Sweep summary persisted next to the result files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Hash of the canonical plan encoding.
    pub plan_hash: String,
    /// RFC 3339 creation time (UTC).
    pub created_at: String,
    /// Replications per cell.
    pub replications: u32,
    /// Step cap per replication.
    pub max_iter: u64,
    /// Computed cells with their convergence counts.
    pub cells: Vec<CellSummary>,
    /// Cells skipped by the stop policy.
    pub skipped: Vec<SkippedCell>,
}

impl SweepReport {
    /// Summarises a finished sweep.
    pub fn new(plan: &SweepPlan, outcome: &SweepOutcome) -> Result<Self, DivError> {
        Ok(Self {
            plan_hash: plan.plan_hash()?,
            created_at: Utc::now().to_rfc3339(),
            replications: plan.replications,
            max_iter: plan.max_iter,
            cells: outcome.cells.clone(),
            skipped: outcome.skipped.clone(),
        })
    }

    /// Total converged replications across all cells.
    pub fn converged(&self) -> u64 {
        self.cells.iter().map(|cell| u64::from(cell.converged)).sum()
    }
}

/// Writes the report as canonical JSON.
pub fn write_report(path: &Path, report: &SweepReport) -> Result<(), DivError> {
    let bytes = to_canonical_json_bytes(report)?;
    fs::write(path, bytes).map_err(|err| {
        DivError::Io(
            ErrorInfo::new("report_write", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })
}
