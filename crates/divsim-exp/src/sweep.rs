//! Grid orchestrator over (scenario × tau) cells.

use std::time::Instant;

use divsim_core::errors::ErrorInfo;
use divsim_core::{DivError, MergedResults, ReplicationKey, ReplicationMap, Scenario};
use divsim_index::{empty_results, reduce_map_into};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::plan::SweepPlan;
use crate::policy::StopPolicy;
use crate::pool::TaskPool;
use crate::worker::{ReplicationTask, ReplicationWorker};

/// Convergence summary of one computed cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSummary {
    /// Scenario key.
    pub prop_mix: String,
    /// Scenario display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Tolerance value.
    pub tau: f64,
    /// Replications dispatched.
    pub replications: u32,
    /// Replications that converged.
    pub converged: u32,
}

/// Cell not computed because the stop policy retired its scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedCell {
    /// Scenario key.
    pub prop_mix: String,
    /// Tolerance value.
    pub tau: f64,
}

/// Everything a sweep produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepOutcome {
    /// Index records sorted by `(tau, prop_mix, rep_id, group)`.
    pub results: MergedResults,
    /// Raw replication maps in the same order (empty unless `keep_maps`).
    pub maps: Vec<ReplicationMap>,
    /// Computed cells in visiting order.
    pub cells: Vec<CellSummary>,
    /// Cells skipped by the stop policy.
    pub skipped: Vec<SkippedCell>,
}

/// Runs the sweep with the plan's own scheduler and stop policy.
pub fn run_sweep(plan: &SweepPlan, worker: &dyn ReplicationWorker) -> Result<SweepOutcome, DivError> {
    run_sweep_with_policy(plan, worker, &plan.early_stop)
}

/// Runs the sweep with an explicit stop policy.
pub fn run_sweep_with_policy(
    plan: &SweepPlan,
    worker: &dyn ReplicationWorker,
    policy: &dyn StopPolicy,
) -> Result<SweepOutcome, DivError> {
    let pool = plan.scheduler.build_pool()?;
    run_sweep_on(plan, pool.as_ref(), worker, policy)
}

/// Runs the sweep on a caller-supplied task pool.
///
/// For every scenario the tau values are visited in plan order. After each
/// cell the policy may retire the scenario, in which case its remaining tau
/// values are recorded as skipped. A worker error aborts the whole sweep.
pub fn run_sweep_on(
    plan: &SweepPlan,
    pool: &dyn TaskPool,
    worker: &dyn ReplicationWorker,
    policy: &dyn StopPolicy,
) -> Result<SweepOutcome, DivError> {
    plan.validate()?;
    let taus = plan.tau_values();
    let scenarios = plan.build_scenarios()?;
    let started = Instant::now();

    let mut outcome = SweepOutcome {
        results: empty_results(),
        maps: Vec::new(),
        cells: Vec::new(),
        skipped: Vec::new(),
    };

    for scenario in &scenarios {
        let mut productive = true;
        for (position, &tau) in taus.iter().enumerate() {
            if !productive {
                outcome.skipped.push(SkippedCell {
                    prop_mix: scenario.key().to_string(),
                    tau,
                });
                continue;
            }
            let cell = run_cell(plan, scenario, tau, pool, worker, &mut outcome)?;
            if policy.retire(&cell) {
                productive = false;
                let remaining = &taus[position + 1..];
                if !remaining.is_empty() {
                    warn!(
                        prop_mix = scenario.key(),
                        label = scenario.label().unwrap_or_default(),
                        tau,
                        skipped = ?remaining,
                        "no replication converged, retiring scenario"
                    );
                }
            }
            outcome.cells.push(cell);
        }
    }

    outcome.results.sort_canonical();
    outcome
        .maps
        .sort_by(|left, right| left.key.canonical_cmp(&right.key));
    info!(
        cells = outcome.cells.len(),
        skipped = outcome.skipped.len(),
        spatial_rows = outcome.results.spatial.len(),
        elapsed_secs = started.elapsed().as_secs_f64(),
        "sweep finished"
    );
    Ok(outcome)
}

fn run_cell(
    plan: &SweepPlan,
    scenario: &Scenario,
    tau: f64,
    pool: &dyn TaskPool,
    worker: &dyn ReplicationWorker,
    outcome: &mut SweepOutcome,
) -> Result<CellSummary, DivError> {
    let started = Instant::now();
    let tasks: Vec<ReplicationTask> = (0..plan.replications)
        .map(|rep_id| ReplicationTask {
            rep_id,
            tau,
            scenario: scenario.clone(),
            world: plan.world.clone(),
            max_iter: plan.max_iter,
        })
        .collect();
    debug!(prop_mix = scenario.key(), tau, tasks = tasks.len(), "dispatching cell");

    let mut replications = pool.map(&tasks, worker)?;
    replications.sort_by_key(|replication| replication.rep_id);
    let ids_match = replications.len() == tasks.len()
        && replications
            .iter()
            .zip(&tasks)
            .all(|(replication, task)| replication.rep_id == task.rep_id);
    if !ids_match {
        return Err(DivError::World(
            ErrorInfo::new("worker-outcomes", "pool returned a mismatched set of replications")
                .with_context("prop_mix", scenario.key())
                .with_context("tau", tau.to_string())
                .with_context("expected", tasks.len().to_string())
                .with_context("returned", replications.len().to_string()),
        ));
    }

    let mut converged = 0;
    for replication in replications {
        if replication.converged {
            converged += 1;
        }
        let key = ReplicationKey::new(tau, scenario.key(), replication.rep_id);
        let map = ReplicationMap::from_outcome(
            key,
            replication.steps,
            replication.table,
            replication.converged,
        );
        reduce_map_into(&mut outcome.results, &map, scenario, None)?;
        if plan.keep_maps {
            outcome.maps.push(map);
        }
    }

    info!(
        prop_mix = scenario.key(),
        label = scenario.label().unwrap_or_default(),
        tau,
        converged,
        replications = plan.replications,
        elapsed_secs = started.elapsed().as_secs_f64(),
        "cell finished"
    );
    Ok(CellSummary {
        prop_mix: scenario.key().to_string(),
        label: scenario.label().map(str::to_string),
        tau,
        replications: plan.replications,
        converged,
    })
}
