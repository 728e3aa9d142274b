//! CSV codecs for map files (raw frequency tables) and index files.
//!
//! Readers resolve columns by header name, so column order is free and extra
//! columns are ignored. Count columns are the ones named `g0`, `g1`, ...; an
//! empty cell is a missing count.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use divsim_core::errors::ErrorInfo;
use divsim_core::{
    group_id, parse_group_id, DivError, JobMeta, RecordLevel, ReplicationKey, ReplicationMap,
    ResultTable,
};

pub(crate) fn wrap_csv(code: &str, err: csv::Error) -> DivError {
    DivError::Serde(ErrorInfo::new(code, "CSV codec failure").with_hint(err.to_string()))
}

fn io_error(code: &str, path: &Path, err: std::io::Error) -> DivError {
    DivError::Io(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}

/// One neighbourhood row of a map file.
#[derive(Debug, Clone, PartialEq)]
pub struct MapRow {
    /// Replication the row belongs to.
    pub key: ReplicationKey,
    /// Neighbourhood id.
    pub neighborhood: String,
    /// Steps taken by the replication.
    pub ticks: u64,
    /// Count per group column, `None` where the cell is empty.
    pub counts: Vec<Option<u64>>,
    /// Partition keys of job map files.
    pub job: Option<JobMeta>,
    /// Source line, for error context.
    pub line: u64,
}

#[derive(Debug, Clone)]
struct MapColumns {
    tau: usize,
    prop_mix: usize,
    rep_id: usize,
    neighborhood: usize,
    ticks: usize,
    groups: Vec<Option<usize>>,
    job: Option<(usize, usize, usize)>,
}

impl MapColumns {
    fn resolve(headers: &StringRecord, require_job: bool) -> Result<Self, DivError> {
        let find = |name: &str| headers.iter().position(|header| header.trim() == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| {
                DivError::Table(
                    ErrorInfo::new("map-missing-column", "map file lacks a required column")
                        .with_context("column", name),
                )
            })
        };

        let neighborhood = match find("neighborhood") {
            Some(idx) => idx,
            None => require("group")?,
        };
        let mut groups: Vec<Option<usize>> = Vec::new();
        for (idx, header) in headers.iter().enumerate() {
            if let Some(group) = parse_group_id(header.trim()) {
                let width = group
                    .checked_add(1)
                    .filter(|width| *width <= headers.len())
                    .ok_or_else(|| {
                        DivError::Table(
                            ErrorInfo::new(
                                "map-group-column",
                                "group column index exceeds the number of columns",
                            )
                            .with_context("column", header.trim())
                            .with_context("columns", headers.len().to_string()),
                        )
                    })?;
                if groups.len() < width {
                    groups.resize(width, None);
                }
                groups[group] = Some(idx);
            }
        }
        if groups.is_empty() {
            return Err(DivError::Table(
                ErrorInfo::new("map-missing-column", "map file has no group count columns")
                    .with_hint("count columns are named g0, g1, ..."),
            ));
        }

        let job = match (find("vacr"), find("city"), find("job")) {
            (Some(vacr), Some(city), Some(job)) => Some((vacr, city, job)),
            _ if require_job => {
                require("vacr")?;
                require("city")?;
                require("job")?;
                None
            }
            _ => None,
        };

        Ok(Self {
            tau: require("tau")?,
            prop_mix: require("prop_mix")?,
            rep_id: require("rep_id")?,
            neighborhood,
            ticks: require("ticks")?,
            groups,
            job,
        })
    }
}

/// Streaming reader over a map file.
pub struct MapReader<R> {
    reader: csv::Reader<R>,
    columns: MapColumns,
    record: StringRecord,
}

impl<R: Read> MapReader<R> {
    /// Opens a map file; job columns are read when all three are present.
    pub fn new(source: R) -> Result<Self, DivError> {
        Self::open(source, false)
    }

    /// Opens a job map file, which must carry `vacr`, `city` and `job`.
    pub fn with_job_columns(source: R) -> Result<Self, DivError> {
        Self::open(source, true)
    }

    fn open(source: R, require_job: bool) -> Result<Self, DivError> {
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(source);
        let headers = reader
            .headers()
            .map_err(|err| wrap_csv("map-header", err))?
            .clone();
        let columns = MapColumns::resolve(&headers, require_job)?;
        Ok(Self {
            reader,
            columns,
            record: StringRecord::new(),
        })
    }

    /// Number of group count columns in the file.
    pub fn group_columns(&self) -> usize {
        self.columns.groups.len()
    }

    /// Reads the next row, or `None` at end of input.
    pub fn next_row(&mut self) -> Result<Option<MapRow>, DivError> {
        let more = self
            .reader
            .read_record(&mut self.record)
            .map_err(|err| wrap_csv("map-record", err))?;
        if !more {
            return Ok(None);
        }
        let record = &self.record;
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        let columns = &self.columns;
        let cell = |idx: usize| record.get(idx).unwrap_or("").trim();

        let key = ReplicationKey::new(
            parse_field(cell(columns.tau), "tau", line)?,
            cell(columns.prop_mix),
            parse_field(cell(columns.rep_id), "rep_id", line)?,
        );
        let counts = columns
            .groups
            .iter()
            .enumerate()
            .map(|(group, idx)| match idx {
                Some(idx) => parse_count(cell(*idx), group, line),
                None => Ok(None),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let job = match columns.job {
            Some((vacr, city, job)) => Some(JobMeta {
                vacr: parse_field(cell(vacr), "vacr", line)?,
                city: cell(city).to_string(),
                job: cell(job).to_string(),
            }),
            None => None,
        };
        Ok(Some(MapRow {
            key,
            neighborhood: cell(columns.neighborhood).to_string(),
            ticks: parse_field(cell(columns.ticks), "ticks", line)?,
            counts,
            job,
            line,
        }))
    }
}

impl MapReader<File> {
    /// Opens a map file on disk.
    pub fn from_path(path: &Path) -> Result<Self, DivError> {
        let file = File::open(path).map_err(|err| io_error("map_open", path, err))?;
        Self::new(file)
    }
}

impl<R: Read> Iterator for MapReader<R> {
    type Item = Result<MapRow, DivError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}

fn parse_field<T: std::str::FromStr>(value: &str, column: &str, line: u64) -> Result<T, DivError> {
    value.parse().map_err(|_| {
        DivError::Table(
            ErrorInfo::new("map-field", "malformed map field")
                .with_context("column", column)
                .with_context("line", line.to_string())
                .with_context("value", value),
        )
    })
}

/// Empty and `NaN` cells are missing; integral floats (`12.0`) are accepted.
fn parse_count(value: &str, group: usize, line: u64) -> Result<Option<u64>, DivError> {
    if value.is_empty() || value.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    if let Ok(count) = value.parse::<u64>() {
        return Ok(Some(count));
    }
    match value.parse::<f64>() {
        Ok(count) if count >= 0.0 && count.fract() == 0.0 && count <= u64::MAX as f64 => {
            Ok(Some(count as u64))
        }
        _ => Err(DivError::Table(
            ErrorInfo::new("map-count", "group counts must be non-negative integers")
                .with_context("column", group_id(group))
                .with_context("line", line.to_string())
                .with_context("value", value),
        )),
    }
}

/// Writes raw replication maps as CSV.
///
/// The header carries `g0..g{K-1}` for the largest group count K among the
/// maps. Cells past a map's own group count, and every count of a discarded
/// map, are left empty.
pub fn write_maps<W: Write>(sink: W, maps: &[ReplicationMap]) -> Result<(), DivError> {
    let width = maps.iter().map(|map| map.group_count).max().unwrap_or(0);
    let mut writer = WriterBuilder::new().from_writer(sink);
    let mut header: Vec<String> = ["tau", "prop_mix", "rep_id", "neighborhood", "ticks"]
        .iter()
        .map(|name| name.to_string())
        .collect();
    header.extend((0..width).map(group_id));
    writer
        .write_record(&header)
        .map_err(|err| wrap_csv("map-write-header", err))?;

    for map in maps {
        for (row, neighborhood) in map.neighborhoods.iter().enumerate() {
            let mut record = vec![
                map.key.tau.to_string(),
                map.key.prop_mix.clone(),
                map.key.rep_id.to_string(),
                neighborhood.clone(),
                map.ticks.to_string(),
            ];
            for group in 0..width {
                let count = match &map.table {
                    Some(table) if group < table.n_groups() => table.get(row, group).to_string(),
                    _ => String::new(),
                };
                record.push(count);
            }
            writer
                .write_record(&record)
                .map_err(|err| wrap_csv("map-write-row", err))?;
        }
    }
    writer
        .flush()
        .map_err(|err| wrap_csv("map-flush", err.into()))?;
    Ok(())
}

/// Writes maps to a file.
pub fn write_maps_path(path: &Path, maps: &[ReplicationMap]) -> Result<(), DivError> {
    let file = File::create(path).map_err(|err| io_error("map_create", path, err))?;
    write_maps(file, maps)
}

/// Writes an index result table as CSV; missing values are empty cells.
pub fn write_results<W: Write>(sink: W, table: &ResultTable) -> Result<(), DivError> {
    let with_group = table.level == RecordLevel::Spatial;
    let with_job = table.has_job_meta();
    let mut writer = WriterBuilder::new().from_writer(sink);

    let mut header = vec!["tau".to_string(), "prop_mix".into(), "rep_id".into()];
    if with_group {
        header.push("group".into());
    }
    if with_job {
        header.extend(["vacr".to_string(), "city".into(), "job".into()]);
    }
    header.push("ticks".into());
    header.extend(table.columns.iter().cloned());
    writer
        .write_record(&header)
        .map_err(|err| wrap_csv("results-write-header", err))?;

    for record in &table.rows {
        let mut row = vec![
            record.tau.to_string(),
            record.prop_mix.clone(),
            record.rep_id.to_string(),
        ];
        if with_group {
            row.push(record.group.clone().unwrap_or_default());
        }
        if with_job {
            match &record.job {
                Some(meta) => row.extend([meta.vacr.to_string(), meta.city.clone(), meta.job.clone()]),
                None => row.extend([String::new(), String::new(), String::new()]),
            }
        }
        row.push(record.ticks.to_string());
        row.extend(
            record
                .values
                .iter()
                .map(|value| value.map(|v| v.to_string()).unwrap_or_default()),
        );
        writer
            .write_record(&row)
            .map_err(|err| wrap_csv("results-write-row", err))?;
    }
    writer
        .flush()
        .map_err(|err| wrap_csv("results-flush", err.into()))?;
    Ok(())
}

/// Writes a result table to a file.
pub fn write_results_path(path: &Path, table: &ResultTable) -> Result<(), DivError> {
    let file = File::create(path).map_err(|err| io_error("results_create", path, err))?;
    write_results(file, table)
}
