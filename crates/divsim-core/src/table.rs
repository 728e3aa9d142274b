//! Neighbourhood by group occupancy tables.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::{DivError, ErrorInfo};
use crate::scenario::group_id;

/// Counts of each population group within each spatial neighbourhood.
///
/// Rows are neighbourhoods, columns are groups. Counts are stored row-major.
/// Row totals reflect local occupancy and need not be equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyTable {
    rows: Vec<String>,
    groups: Vec<String>,
    counts: Vec<u64>,
}

impl FrequencyTable {
    /// Creates a table from row ids, group ids and row-major counts.
    pub fn new(rows: Vec<String>, groups: Vec<String>, counts: Vec<u64>) -> Result<Self, DivError> {
        if groups.is_empty() {
            return Err(DivError::Table(ErrorInfo::new(
                "table-no-groups",
                "frequency table needs at least one group column",
            )));
        }
        if counts.len() != rows.len() * groups.len() {
            return Err(DivError::Table(
                ErrorInfo::new("table-shape", "count buffer does not match table shape")
                    .with_context("rows", rows.len().to_string())
                    .with_context("groups", groups.len().to_string())
                    .with_context("counts", counts.len().to_string()),
            ));
        }
        ensure_unique("row", &rows)?;
        ensure_unique("group", &groups)?;
        Ok(Self {
            rows,
            groups,
            counts,
        })
    }

    /// Creates a table with default `n{i}` row ids and `g{j}` group ids.
    pub fn with_default_ids(
        n_rows: usize,
        n_groups: usize,
        counts: Vec<u64>,
    ) -> Result<Self, DivError> {
        let rows = (0..n_rows).map(neighborhood_id).collect();
        let groups = (0..n_groups).map(group_id).collect();
        Self::new(rows, groups, counts)
    }

    /// Creates a table from nested per-row counts with default ids.
    pub fn from_rows(rows: &[Vec<u64>]) -> Result<Self, DivError> {
        let n_groups = rows.first().map(Vec::len).unwrap_or(0);
        if rows.iter().any(|row| row.len() != n_groups) {
            return Err(DivError::Table(ErrorInfo::new(
                "table-ragged",
                "all rows must have the same number of groups",
            )));
        }
        let counts = rows.iter().flatten().copied().collect();
        Self::with_default_ids(rows.len(), n_groups, counts)
    }

    /// Neighbourhood identifiers.
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Group identifiers.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Number of neighbourhoods.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of groups.
    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }

    /// Count of `group` in `row`.
    pub fn get(&self, row: usize, group: usize) -> u64 {
        self.counts[row * self.groups.len() + group]
    }

    /// Counts of a single neighbourhood.
    pub fn row(&self, row: usize) -> &[u64] {
        let width = self.groups.len();
        &self.counts[row * width..(row + 1) * width]
    }

    /// Counts of a single group across neighbourhoods.
    pub fn column(&self, group: usize) -> impl Iterator<Item = u64> + '_ {
        (0..self.rows.len()).map(move |row| self.get(row, group))
    }

    /// Occupancy of each neighbourhood.
    pub fn row_totals(&self) -> Vec<u64> {
        (0..self.rows.len())
            .map(|row| self.row(row).iter().sum())
            .collect()
    }

    /// Population of each group.
    pub fn column_totals(&self) -> Vec<u64> {
        (0..self.groups.len())
            .map(|group| self.column(group).sum())
            .collect()
    }

    /// Total population.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Formats the identifier of the neighbourhood at `index`.
pub fn neighborhood_id(index: usize) -> String {
    format!("n{index}")
}

fn ensure_unique(kind: &str, ids: &[String]) -> Result<(), DivError> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id.as_str()) {
            return Err(DivError::Table(
                ErrorInfo::new("table-duplicate-id", format!("duplicate {kind} identifier"))
                    .with_context(kind, id.clone()),
            ));
        }
    }
    Ok(())
}
