//! Replication worker: one stochastic world run per task descriptor.

use divsim_core::errors::ErrorInfo;
use divsim_core::{DivError, FrequencyTable, RngHandle, Scenario};
use divsim_world::{SchellingFactory, WorldConfig, WorldFactory, WorldParams};
use serde::Serialize;

/// Everything a worker needs to run one replication.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplicationTask {
    /// Replication id, unique within the cell.
    pub rep_id: u32,
    /// Tolerance of the cell.
    pub tau: f64,
    /// Population mix of the cell.
    pub scenario: Scenario,
    /// Lattice and population settings.
    pub world: WorldConfig,
    /// Step cap.
    pub max_iter: u64,
}

/// Raw result of one replication, before the convergence contract is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicationOutcome {
    /// Replication id copied from the task.
    pub rep_id: u32,
    /// Exported neighbourhood by group counts.
    pub table: FrequencyTable,
    /// True if the world stabilised within the step cap.
    pub converged: bool,
    /// Steps the world took.
    pub steps: u64,
}

/// Executes replication tasks. Errors are fatal to the whole sweep.
pub trait ReplicationWorker: Send + Sync {
    /// Runs one task.
    fn run(&self, task: &ReplicationTask) -> Result<ReplicationOutcome, DivError>;
}

/// Worker driving a [`WorldFactory`], reseeding from OS entropy per task.
#[derive(Debug, Clone, Default)]
pub struct WorldWorker<F = SchellingFactory> {
    factory: F,
}

impl<F: WorldFactory> WorldWorker<F> {
    /// Wraps a world factory.
    pub fn new(factory: F) -> Self {
        Self { factory }
    }
}

impl<F: WorldFactory> ReplicationWorker for WorldWorker<F> {
    fn run(&self, task: &ReplicationTask) -> Result<ReplicationOutcome, DivError> {
        run_replication(task, &self.factory, RngHandle::from_entropy())
    }
}

/// Builds, runs and exports one world for `task`.
///
/// The returned table always has the scenario's group count as columns,
/// whether or not the world converged.
pub fn run_replication(
    task: &ReplicationTask,
    factory: &dyn WorldFactory,
    mut rng: RngHandle,
) -> Result<ReplicationOutcome, DivError> {
    let params = WorldParams {
        config: task.world.clone(),
        tolerance: task.tau,
        group_proportions: task.scenario.proportions().to_vec(),
        max_iterations: task.max_iter,
    };
    let mut world = factory.build(&params)?;
    world.setup(&mut rng)?;
    world.run(&mut rng, task.max_iter)?;
    let table = world.export()?;
    if table.n_groups() != task.scenario.group_count() {
        return Err(DivError::World(
            ErrorInfo::new(
                "world-group-count",
                "exported table columns do not match the scenario's group count",
            )
            .with_context("prop_mix", task.scenario.key())
            .with_context("rep_id", task.rep_id.to_string())
            .with_context("columns", table.n_groups().to_string()),
        ));
    }
    Ok(ReplicationOutcome {
        rep_id: task.rep_id,
        table,
        converged: world.converged(),
        steps: world.steps_taken(),
    })
}
