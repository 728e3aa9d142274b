//! Replication identities and their (possibly discarded) frequency tables.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::table::FrequencyTable;

/// Identity of one replication inside the sweep grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicationKey {
    /// Tolerance parameter of the experiment cell.
    pub tau: f64,
    /// Canonical scenario key of the experiment cell.
    pub prop_mix: String,
    /// Replication id, unique within the cell.
    pub rep_id: u32,
}

impl ReplicationKey {
    /// Creates a new key.
    pub fn new(tau: f64, prop_mix: impl Into<String>, rep_id: u32) -> Self {
        Self {
            tau,
            prop_mix: prop_mix.into(),
            rep_id,
        }
    }

    /// Exact identity comparison (tau compared bitwise).
    pub fn same_as(&self, other: &ReplicationKey) -> bool {
        self.tau.to_bits() == other.tau.to_bits()
            && self.rep_id == other.rep_id
            && self.prop_mix == other.prop_mix
    }

    /// Canonical ordering: tau, then scenario key, then replication id.
    pub fn canonical_cmp(&self, other: &ReplicationKey) -> Ordering {
        self.tau
            .total_cmp(&other.tau)
            .then_with(|| self.prop_mix.cmp(&other.prop_mix))
            .then_with(|| self.rep_id.cmp(&other.rep_id))
    }
}

/// Output of one replication after the convergence contract was applied.
///
/// A replication that failed to converge keeps its identity, step count and
/// table shape, but its counts are discarded (`table == None`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicationMap {
    /// Replication identity.
    pub key: ReplicationKey,
    /// Steps the world model took.
    pub ticks: u64,
    /// Neighbourhood ids of the exported table.
    pub neighborhoods: Vec<String>,
    /// Number of group columns of the exported table.
    pub group_count: usize,
    /// Counts, present only when the replication converged.
    pub table: Option<FrequencyTable>,
}

impl ReplicationMap {
    /// Wraps a table, discarding its counts unless `converged` is set.
    pub fn from_outcome(
        key: ReplicationKey,
        ticks: u64,
        table: FrequencyTable,
        converged: bool,
    ) -> Self {
        if converged {
            Self::converged(key, ticks, table)
        } else {
            Self::discarded(key, ticks, table.rows().to_vec(), table.n_groups())
        }
    }

    /// Map for a converged replication.
    pub fn converged(key: ReplicationKey, ticks: u64, table: FrequencyTable) -> Self {
        Self {
            key,
            ticks,
            neighborhoods: table.rows().to_vec(),
            group_count: table.n_groups(),
            table: Some(table),
        }
    }

    /// Map for a replication whose counts were discarded.
    pub fn discarded(
        key: ReplicationKey,
        ticks: u64,
        neighborhoods: Vec<String>,
        group_count: usize,
    ) -> Self {
        Self {
            key,
            ticks,
            neighborhoods,
            group_count,
            table: None,
        }
    }

    /// True when the counts survived the convergence contract.
    pub fn is_converged(&self) -> bool {
        self.table.is_some()
    }
}
