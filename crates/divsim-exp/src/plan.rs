use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use divsim_core::errors::ErrorInfo;
use divsim_core::{DivError, Scenario};
use divsim_world::WorldConfig;
use serde::{Deserialize, Serialize};

use crate::hash::stable_hash_string;
use crate::policy::EarlyStop;
use crate::pool::{SequentialPool, TaskPool, ThreadPool};
use crate::serde::{from_yaml_slice, to_yaml_string};

fn config_error(code: &str, message: impl Into<String>) -> DivError {
    DivError::Config(ErrorInfo::new(code, message))
}

/// Tolerance values of the sweep: explicit or evenly spaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TauGrid {
    /// Values visited in the given order.
    Values(Vec<f64>),
    /// `num` evenly spaced values from `start` to `stop`, both ends included.
    Linspace {
        /// First value.
        start: f64,
        /// Last value.
        stop: f64,
        /// Number of values.
        num: usize,
    },
}

impl TauGrid {
    /// Expands the grid into its ordered values.
    pub fn values(&self) -> Vec<f64> {
        match self {
            TauGrid::Values(values) => values.clone(),
            TauGrid::Linspace { start, stop, num } => match *num {
                0 => Vec::new(),
                1 => vec![*start],
                n => {
                    let step = (stop - start) / (n - 1) as f64;
                    (0..n)
                        .map(|idx| if idx == n - 1 { *stop } else { start + step * idx as f64 })
                        .collect()
                }
            },
        }
    }
}

/// Population mix entry of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    /// Group proportions; the final remainder group may be omitted.
    pub proportions: Vec<f64>,
    /// Display label carried into logs and reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ScenarioSpec {
    /// Builds the validated scenario.
    pub fn to_scenario(&self) -> Result<Scenario, DivError> {
        let scenario = Scenario::new(&self.proportions)?;
        Ok(match &self.label {
            Some(label) => scenario.with_label(label.clone()),
            None => scenario,
        })
    }
}

/// Execution mode for replication batches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scheduler {
    /// Fan replications out over a thread pool.
    #[serde(default = "Scheduler::default_parallel")]
    pub parallel: bool,
    /// Pool size; zero lets rayon pick.
    #[serde(default)]
    pub threads: usize,
}

impl Scheduler {
    const fn default_parallel() -> bool {
        true
    }

    /// Builds the task pool this scheduler describes.
    pub fn build_pool(&self) -> Result<Box<dyn TaskPool>, DivError> {
        if self.parallel {
            Ok(Box::new(ThreadPool::new(self.threads)?))
        } else {
            Ok(Box::new(SequentialPool))
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            parallel: Self::default_parallel(),
            threads: 0,
        }
    }
}

/// Grid sweep over scenarios and tolerance values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPlan {
    /// Tolerance values, visited in order for every scenario.
    pub taus: TauGrid,
    /// Population mixes.
    pub scenarios: Vec<ScenarioSpec>,
    /// Lattice and population settings shared by every replication.
    #[serde(default)]
    pub world: WorldConfig,
    /// Replications per cell.
    #[serde(default = "default_replications")]
    pub replications: u32,
    /// Step cap per replication.
    #[serde(default = "default_max_iter")]
    pub max_iter: u64,
    /// Sequential or pooled execution.
    #[serde(default)]
    pub scheduler: Scheduler,
    /// Scenario retirement policy.
    #[serde(default)]
    pub early_stop: EarlyStop,
    /// Keep raw frequency tables for export.
    #[serde(default = "default_keep_maps")]
    pub keep_maps: bool,
}

fn default_replications() -> u32 {
    100
}

fn default_max_iter() -> u64 {
    1000
}

fn default_keep_maps() -> bool {
    true
}

impl SweepPlan {
    /// Plan over explicit taus and proportion lists with default settings.
    pub fn new(taus: Vec<f64>, scenarios: &[&[f64]]) -> Self {
        Self {
            taus: TauGrid::Values(taus),
            scenarios: scenarios
                .iter()
                .map(|proportions| ScenarioSpec {
                    proportions: proportions.to_vec(),
                    label: None,
                })
                .collect(),
            world: WorldConfig::default(),
            replications: default_replications(),
            max_iter: default_max_iter(),
            scheduler: Scheduler::default(),
            early_stop: EarlyStop::default(),
            keep_maps: default_keep_maps(),
        }
    }

    /// Expanded tau values.
    pub fn tau_values(&self) -> Vec<f64> {
        self.taus.values()
    }

    /// Validated scenarios in plan order.
    pub fn build_scenarios(&self) -> Result<Vec<Scenario>, DivError> {
        self.scenarios.iter().map(ScenarioSpec::to_scenario).collect()
    }

    /// Checks the grid, the scenarios and the world configuration.
    pub fn validate(&self) -> Result<(), DivError> {
        let taus = self.tau_values();
        if taus.is_empty() {
            return Err(config_error("plan-taus-empty", "plan has no tau values"));
        }
        if let Some(tau) = taus.iter().find(|tau| !(0.0..=1.0).contains(*tau)) {
            return Err(DivError::Config(
                ErrorInfo::new("plan-tau", "tau values must lie in [0, 1]")
                    .with_context("tau", tau.to_string()),
            ));
        }
        if self.scenarios.is_empty() {
            return Err(config_error("plan-scenarios-empty", "plan has no scenarios"));
        }
        if self.replications == 0 {
            return Err(config_error(
                "plan-replications",
                "plan needs at least one replication per cell",
            ));
        }
        let mut keys = BTreeSet::new();
        for scenario in self.build_scenarios()? {
            if !keys.insert(scenario.key().to_string()) {
                return Err(DivError::Config(
                    ErrorInfo::new("plan-duplicate-scenario", "scenario listed twice")
                        .with_context("prop_mix", scenario.key()),
                ));
            }
        }
        self.world.validate()
    }

    /// Hash of the canonical JSON encoding of the plan.
    pub fn plan_hash(&self) -> Result<String, DivError> {
        stable_hash_string(self)
    }

    /// YAML rendering of the plan.
    pub fn to_yaml_string(&self) -> Result<String, DivError> {
        to_yaml_string(self)
    }
}

/// Reads and validates a YAML sweep plan.
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<SweepPlan, DivError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|err| {
        DivError::Io(
            ErrorInfo::new("plan_read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    let plan: SweepPlan = from_yaml_slice(&bytes)?;
    plan.validate()?;
    Ok(plan)
}
