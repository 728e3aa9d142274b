//! Conversion of replication maps into labelled index records.
//!
//! The sweep and both aggregators build their records here, which keeps the
//! in-memory and on-disk paths on one output schema.

use divsim_core::{
    DivError, ErrorInfo, IndexRecord, JobMeta, MergedResults, ReplicationMap, Scenario,
};

use crate::engine::{global_columns, global_indices, spatial_columns, spatial_indices};

/// Empty result tables carrying the engine's column sets.
pub fn empty_results() -> MergedResults {
    MergedResults::new(spatial_columns(), global_columns())
}

/// Appends the spatial and global records of one replication to `results`.
///
/// Group ids are rewritten to proportion-annotated labels from `scenario`.
/// A map whose counts were discarded still contributes one record per group
/// and one global record, with every index value missing.
pub fn reduce_map_into(
    results: &mut MergedResults,
    map: &ReplicationMap,
    scenario: &Scenario,
    job: Option<&JobMeta>,
) -> Result<(), DivError> {
    if scenario.key() != map.key.prop_mix {
        return Err(DivError::Table(
            ErrorInfo::new("scenario-mismatch", "map does not belong to the scenario")
                .with_context("map", map.key.prop_mix.clone())
                .with_context("scenario", scenario.key()),
        ));
    }
    if map.group_count != scenario.group_count() {
        return Err(DivError::Table(
            ErrorInfo::new(
                "group-count-mismatch",
                "table columns do not match the scenario's group count",
            )
            .with_context("prop_mix", scenario.key())
            .with_context("rep_id", map.key.rep_id.to_string())
            .with_context("columns", map.group_count.to_string()),
        ));
    }

    let record = |group: Option<String>, values: Vec<Option<f64>>| IndexRecord {
        tau: map.key.tau,
        prop_mix: map.key.prop_mix.clone(),
        rep_id: map.key.rep_id,
        group,
        ticks: map.ticks,
        job: job.cloned(),
        values,
    };

    match &map.table {
        Some(table) => {
            for indices in spatial_indices(table) {
                let label = scenario.annotate(&indices.group).ok_or_else(|| {
                    DivError::Table(
                        ErrorInfo::new("unknown-group", "group id has no scenario proportion")
                            .with_context("group", indices.group.clone())
                            .with_context("prop_mix", scenario.key()),
                    )
                })?;
                let values = indices.values.into_iter().map(Some).collect();
                results.spatial.push(record(Some(label), values))?;
            }
            let values = global_indices(table).into_iter().map(Some).collect();
            results.global.push(record(None, values))?;
        }
        None => {
            let width = results.spatial.columns.len();
            for index in 0..scenario.group_count() {
                let label = scenario.group_label(index);
                results.spatial.push(record(label, vec![None; width]))?;
            }
            let width = results.global.columns.len();
            results.global.push(record(None, vec![None; width]))?;
        }
    }
    Ok(())
}
