//! Early-stop policies deciding when a scenario stops producing cells.

use serde::{Deserialize, Serialize};

use crate::sweep::CellSummary;

/// Decides, after each finished cell, whether the scenario's remaining
/// (larger) tau values are skipped.
pub trait StopPolicy: Send + Sync {
    /// True to retire the scenario after `cell`.
    fn retire(&self, cell: &CellSummary) -> bool;
}

/// Built-in policies selectable from a sweep plan.
///
/// `AllFailed` assumes non-convergence is monotonic in tau: once every
/// replication of a cell fails, later cells are not attempted. Plans that
/// cannot rely on that assumption select `Never`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EarlyStop {
    /// Retire a scenario once a cell has no converged replication.
    #[default]
    AllFailed,
    /// Always run the full tau grid.
    Never,
}

impl StopPolicy for EarlyStop {
    fn retire(&self, cell: &CellSummary) -> bool {
        match self {
            EarlyStop::AllFailed => cell.converged == 0,
            EarlyStop::Never => false,
        }
    }
}
