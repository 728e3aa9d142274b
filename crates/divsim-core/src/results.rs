//! Index records and the merged result tables built from them.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::errors::{DivError, ErrorInfo};

/// Extra partition keys carried by job-partitioned result sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMeta {
    /// Vacancy rate of the generating world.
    pub vacr: f64,
    /// City identifier.
    pub city: String,
    /// Job identifier.
    pub job: String,
}

/// One row of a result table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    /// Tolerance parameter.
    pub tau: f64,
    /// Canonical scenario key.
    pub prop_mix: String,
    /// Replication id.
    pub rep_id: u32,
    /// Proportion-annotated group label; `None` for global records.
    pub group: Option<String>,
    /// Steps taken by the replication.
    pub ticks: u64,
    /// Job partition keys, when the source carried them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<JobMeta>,
    /// Index values in table column order; `None` marks a missing value.
    pub values: Vec<Option<f64>>,
}

impl IndexRecord {
    /// True when every index value is missing.
    pub fn is_missing(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Ordering by `(tau, prop_mix, rep_id, group)`, then job id.
    pub fn canonical_cmp(&self, other: &IndexRecord) -> Ordering {
        self.tau
            .total_cmp(&other.tau)
            .then_with(|| self.prop_mix.cmp(&other.prop_mix))
            .then_with(|| self.rep_id.cmp(&other.rep_id))
            .then_with(|| self.group.cmp(&other.group))
            .then_with(|| {
                let left = self.job.as_ref().map(|meta| meta.job.as_str());
                let right = other.job.as_ref().map(|meta| meta.job.as_str());
                left.cmp(&right)
            })
    }
}

/// Granularity of a result table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordLevel {
    /// One row per `(tau, prop_mix, rep_id, group)`.
    Spatial,
    /// One row per `(tau, prop_mix, rep_id)`.
    Global,
}

/// Append-only table of index records sharing one column set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    /// Granularity of every row.
    pub level: RecordLevel,
    /// Index column names, in value order.
    pub columns: Vec<String>,
    /// Rows in insertion order.
    pub rows: Vec<IndexRecord>,
}

impl ResultTable {
    /// Creates an empty table with the given index columns.
    pub fn new(level: RecordLevel, columns: Vec<String>) -> Self {
        Self {
            level,
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a record after checking it against the table schema.
    pub fn push(&mut self, record: IndexRecord) -> Result<(), DivError> {
        if record.values.len() != self.columns.len() {
            return Err(DivError::Table(
                ErrorInfo::new("record-width", "record width does not match table columns")
                    .with_context("expected", self.columns.len().to_string())
                    .with_context("found", record.values.len().to_string()),
            ));
        }
        let has_group = record.group.is_some();
        if has_group != (self.level == RecordLevel::Spatial) {
            return Err(DivError::Table(
                ErrorInfo::new("record-level", "record granularity does not match table")
                    .with_context("prop_mix", record.prop_mix.clone())
                    .with_context("rep_id", record.rep_id.to_string()),
            ));
        }
        self.rows.push(record);
        Ok(())
    }

    /// Appends every record of `other`, which must share this table's schema.
    pub fn append(&mut self, other: ResultTable) -> Result<(), DivError> {
        if other.level != self.level || other.columns != self.columns {
            return Err(DivError::Table(ErrorInfo::new(
                "table-schema-mismatch",
                "cannot merge tables with different columns",
            )));
        }
        self.rows.extend(other.rows);
        Ok(())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a named index column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Value of the named column in row `row`.
    pub fn value(&self, row: usize, name: &str) -> Option<f64> {
        let column = self.column_index(name)?;
        self.rows.get(row).and_then(|record| record.values[column])
    }

    /// Sorts rows by the composite key; ties keep insertion order.
    pub fn sort_canonical(&mut self) {
        self.rows.sort_by(IndexRecord::canonical_cmp);
    }

    /// True when any row carries job partition keys.
    pub fn has_job_meta(&self) -> bool {
        self.rows.iter().any(|record| record.job.is_some())
    }
}

/// Spatial and global results produced by one sweep or aggregation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedResults {
    /// Per-group index records.
    pub spatial: ResultTable,
    /// Per-replication index records.
    pub global: ResultTable,
}

impl MergedResults {
    /// Creates empty tables with the given column sets.
    pub fn new(spatial_columns: Vec<String>, global_columns: Vec<String>) -> Self {
        Self {
            spatial: ResultTable::new(RecordLevel::Spatial, spatial_columns),
            global: ResultTable::new(RecordLevel::Global, global_columns),
        }
    }

    /// Appends both tables of `other`.
    pub fn append(&mut self, other: MergedResults) -> Result<(), DivError> {
        self.spatial.append(other.spatial)?;
        self.global.append(other.global)
    }

    /// Sorts both tables by the composite key.
    pub fn sort_canonical(&mut self) {
        self.spatial.sort_canonical();
        self.global.sort_canonical();
    }
}
