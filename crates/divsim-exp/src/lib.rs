//! Replication workers, task pools and the grid sweep orchestrator.

mod hash;
mod plan;
mod policy;
mod pool;
mod report;
mod serde;
mod sweep;
mod worker;

pub use hash::stable_hash_string;
pub use plan::{load_plan, ScenarioSpec, Scheduler, SweepPlan, TauGrid};
pub use policy::{EarlyStop, StopPolicy};
pub use pool::{SequentialPool, TaskPool, ThreadPool};
pub use report::{write_report, SweepReport};
pub use sweep::{
    run_sweep, run_sweep_on, run_sweep_with_policy, CellSummary, SkippedCell, SweepOutcome,
};
pub use worker::{
    run_replication, ReplicationOutcome, ReplicationTask, ReplicationWorker, WorldWorker,
};

pub use crate::serde::{from_json_slice, from_yaml_slice, to_canonical_json_bytes, to_yaml_string};
