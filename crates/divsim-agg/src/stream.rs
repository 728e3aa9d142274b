//! Bounded-memory reduction of a map file.
//!
//! Rows are read in batches of `batch_size`. Each batch is split into runs of
//! consecutive rows sharing a replication key, and every run must be one
//! complete replication: a replication may not straddle two batches, may not
//! reappear after another one started, and every replication must have the
//! same number of neighbourhood rows as the first. A batch size that is not a
//! multiple of the rows per replication is therefore rejected as soon as the
//! first split replication is seen.
//!
//! Memory is bounded by the batch size except for the set of replication keys
//! already seen, which holds one key per replication in the file so that a
//! non-contiguous replication can be detected.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use divsim_core::errors::ErrorInfo;
use divsim_core::{DivError, MergedResults, ReplicationKey};
use divsim_index::empty_results;
use tracing::{debug, info};

use crate::block::{reduce_block, ScenarioCache};
use crate::io::{MapReader, MapRow};

type KeyId = (u64, String, u32);

fn key_id(key: &ReplicationKey) -> KeyId {
    (key.tau.to_bits(), key.prop_mix.clone(), key.rep_id)
}

#[derive(Debug, Default)]
struct Boundaries {
    last: Option<ReplicationKey>,
    seen: HashSet<KeyId>,
    rows_per_replication: Option<usize>,
}

fn integrity(code: &str, message: &str, batch: usize, row: &MapRow) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("batch", batch.to_string())
        .with_context("line", row.line.to_string())
        .with_context("tau", row.key.tau.to_string())
        .with_context("prop_mix", row.key.prop_mix.clone())
        .with_context("rep_id", row.key.rep_id.to_string())
}

impl Boundaries {
    fn check_run(&mut self, batch: usize, position: usize, run: &[MapRow]) -> Result<(), DivError> {
        let head = &run[0];
        if position == 0 {
            if let Some(last) = &self.last {
                if last.same_as(&head.key) {
                    return Err(DivError::Integrity(
                        integrity(
                            "replication-split-across-batches",
                            "a replication spans two batches",
                            batch,
                            head,
                        )
                        .with_hint("choose a batch size that is a multiple of the rows per replication"),
                    ));
                }
            }
        }
        if !self.seen.insert(key_id(&head.key)) {
            return Err(DivError::Integrity(integrity(
                "replication-not-contiguous",
                "replication rows are not contiguous in the input",
                batch,
                head,
            )));
        }
        match self.rows_per_replication {
            None => self.rows_per_replication = Some(run.len()),
            Some(expected) if expected != run.len() => {
                return Err(DivError::Integrity(
                    integrity(
                        "batch-mixed-replications",
                        "batch does not hold whole replications",
                        batch,
                        head,
                    )
                    .with_context("rows", run.len().to_string())
                    .with_context("expected_rows", expected.to_string()),
                ));
            }
            Some(_) => {}
        }
        self.last = Some(head.key.clone());
        Ok(())
    }
}

/// Reduces a map file held in any reader, `batch_size` rows at a time.
pub fn reduce_stream<R: Read>(source: R, batch_size: usize) -> Result<MergedResults, DivError> {
    check_batch_size(batch_size)?;
    reduce_rows(MapReader::new(source)?, batch_size)
}

/// Reduces a map file on disk.
pub fn reduce_stream_path(path: &Path, batch_size: usize) -> Result<MergedResults, DivError> {
    check_batch_size(batch_size)?;
    let reader: MapReader<File> = MapReader::from_path(path)?;
    reduce_rows(reader, batch_size)
}

fn check_batch_size(batch_size: usize) -> Result<(), DivError> {
    if batch_size == 0 {
        return Err(DivError::Config(
            ErrorInfo::new("batch-size", "batch size must be positive")
                .with_hint("use a multiple of the neighbourhoods per replication"),
        ));
    }
    Ok(())
}

fn reduce_rows<R: Read>(mut reader: MapReader<R>, batch_size: usize) -> Result<MergedResults, DivError> {
    let started = Instant::now();
    let mut results = empty_results();
    let mut scenarios = ScenarioCache::default();
    let mut boundaries = Boundaries::default();
    let mut batch: Vec<MapRow> = Vec::with_capacity(batch_size);
    let mut batches = 0usize;

    loop {
        batch.clear();
        while batch.len() < batch_size {
            match reader.next_row()? {
                Some(row) => batch.push(row),
                None => break,
            }
        }
        if batch.is_empty() {
            break;
        }
        batches += 1;

        let mut start = 0;
        let mut position = 0;
        for end in 1..=batch.len() {
            if end < batch.len() && batch[end].key.same_as(&batch[start].key) {
                continue;
            }
            let run = &batch[start..end];
            boundaries.check_run(batches, position, run)?;
            let rows: Vec<&MapRow> = run.iter().collect();
            reduce_block(&rows, &mut scenarios, &mut results)?;
            start = end;
            position += 1;
        }
        debug!(batch = batches, rows = batch.len(), replications = position, "batch reduced");

        if batch.len() < batch_size {
            break;
        }
    }

    info!(
        batches,
        replications = boundaries.seen.len(),
        scenarios = scenarios.len(),
        spatial_rows = results.spatial.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "map stream reduced"
    );
    Ok(results)
}
