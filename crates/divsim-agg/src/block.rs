//! Assembly of one replication's map rows into a [`ReplicationMap`].

use std::collections::HashMap;

use divsim_core::errors::ErrorInfo;
use divsim_core::{DivError, FrequencyTable, MergedResults, ReplicationMap, Scenario};
use divsim_index::reduce_map_into;

use crate::io::MapRow;

/// Scenarios parsed from `prop_mix` keys, parsed once per key.
#[derive(Debug, Default)]
pub(crate) struct ScenarioCache {
    scenarios: HashMap<String, Scenario>,
}

impl ScenarioCache {
    pub(crate) fn get(&mut self, key: &str) -> Result<&Scenario, DivError> {
        if !self.scenarios.contains_key(key) {
            let scenario = Scenario::from_key(key)?;
            self.scenarios.insert(key.to_string(), scenario);
        }
        self.scenarios.get(key).ok_or_else(|| {
            DivError::Scenario(ErrorInfo::new("scenario-cache", "scenario was not cached"))
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.scenarios.len()
    }
}

fn inconsistent(field: &str, first: &MapRow, row: &MapRow) -> DivError {
    DivError::Integrity(
        ErrorInfo::new(
            "partition-inconsistent",
            "rows of one replication disagree on a per-replication field",
        )
        .with_context("field", field)
        .with_context("prop_mix", first.key.prop_mix.clone())
        .with_context("rep_id", first.key.rep_id.to_string())
        .with_context("line", row.line.to_string()),
    )
}

/// Rebuilds the replication map for `rows` and reduces it into `results`.
///
/// Every row must carry the same key, tick count and job metadata. Counts are
/// all-present for a converged replication and all-absent for a discarded
/// one; anything in between is an integrity error.
pub(crate) fn reduce_block(
    rows: &[&MapRow],
    scenarios: &mut ScenarioCache,
    results: &mut MergedResults,
) -> Result<(), DivError> {
    let Some(first) = rows.first() else {
        return Ok(());
    };
    for row in &rows[1..] {
        if !row.key.same_as(&first.key) {
            return Err(inconsistent("key", first, row));
        }
        if row.ticks != first.ticks {
            return Err(inconsistent("ticks", first, row));
        }
        let same_job = match (&row.job, &first.job) {
            (Some(left), Some(right)) => {
                left.vacr.to_bits() == right.vacr.to_bits()
                    && left.city == right.city
                    && left.job == right.job
            }
            (None, None) => true,
            _ => false,
        };
        if !same_job {
            return Err(inconsistent("job", first, row));
        }
    }

    let scenario = scenarios.get(&first.key.prop_mix)?;
    let groups = scenario.group_count();
    let mut counts = Vec::with_capacity(rows.len() * groups);
    let mut missing = 0usize;
    for row in rows {
        if row.counts.len() < groups {
            return Err(DivError::Table(
                ErrorInfo::new("map-missing-column", "map file has fewer count columns than the scenario")
                    .with_context("prop_mix", first.key.prop_mix.clone())
                    .with_context("columns", row.counts.len().to_string()),
            ));
        }
        if let Some(extra) = row.counts[groups..].iter().position(Option::is_some) {
            return Err(DivError::Table(
                ErrorInfo::new("unknown-group", "count present for a group outside the scenario")
                    .with_context("prop_mix", first.key.prop_mix.clone())
                    .with_context("group", (groups + extra).to_string())
                    .with_context("line", row.line.to_string()),
            ));
        }
        for count in &row.counts[..groups] {
            match count {
                Some(count) => counts.push(*count),
                None => missing += 1,
            }
        }
    }
    if missing > 0 && !counts.is_empty() {
        return Err(DivError::Integrity(
            ErrorInfo::new("partial-counts", "replication has both present and missing counts")
                .with_context("prop_mix", first.key.prop_mix.clone())
                .with_context("rep_id", first.key.rep_id.to_string())
                .with_context("missing", missing.to_string()),
        ));
    }

    let neighborhoods: Vec<String> = rows.iter().map(|row| row.neighborhood.clone()).collect();
    let map = if missing == 0 {
        let table = FrequencyTable::new(neighborhoods, scenario.group_ids(), counts)?;
        ReplicationMap::converged(first.key.clone(), first.ticks, table)
    } else {
        ReplicationMap::discarded(first.key.clone(), first.ticks, neighborhoods, groups)
    };
    reduce_map_into(results, &map, scenario, first.job.as_ref())
}
