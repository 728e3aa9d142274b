//! Lattice configuration and per-replication world parameters.

use divsim_core::errors::ErrorInfo;
use divsim_core::DivError;
use serde::{Deserialize, Serialize};

/// Which cells count as neighbours of an agent on the bounded lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NeighborTopology {
    /// Four orthogonal neighbours.
    Rook,
    /// Eight surrounding neighbours.
    #[default]
    Queen,
}

/// YAML-configurable lattice and population settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Cell rows of the lattice.
    #[serde(default = "default_grid")]
    pub grid_rows: usize,
    /// Cell columns of the lattice.
    #[serde(default = "default_grid")]
    pub grid_cols: usize,
    /// Number of neighbourhood rows the lattice is cut into.
    #[serde(default = "default_blocks")]
    pub neighborhood_rows: usize,
    /// Number of neighbourhood columns the lattice is cut into.
    #[serde(default = "default_blocks")]
    pub neighborhood_cols: usize,
    /// Share of cells left empty when `population_size` is not given.
    #[serde(default = "default_vacancy")]
    pub vacancy_fraction: f64,
    /// Explicit population size; overrides `vacancy_fraction`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population_size: Option<usize>,
    /// Neighbour rule used by the happiness test.
    #[serde(default)]
    pub neighbor_topology: NeighborTopology,
}

fn default_grid() -> usize {
    100
}

fn default_blocks() -> usize {
    10
}

fn default_vacancy() -> f64 {
    0.25
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            grid_rows: default_grid(),
            grid_cols: default_grid(),
            neighborhood_rows: default_blocks(),
            neighborhood_cols: default_blocks(),
            vacancy_fraction: default_vacancy(),
            population_size: None,
            neighbor_topology: NeighborTopology::default(),
        }
    }
}

impl WorldConfig {
    /// Total number of lattice cells.
    pub fn cells(&self) -> usize {
        self.grid_rows * self.grid_cols
    }

    /// Number of neighbourhoods (rows of the exported table).
    pub fn neighborhoods(&self) -> usize {
        self.neighborhood_rows * self.neighborhood_cols
    }

    /// Agents placed on the lattice.
    pub fn population(&self) -> usize {
        self.population_size.unwrap_or_else(|| {
            ((1.0 - self.vacancy_fraction) * self.cells() as f64).round() as usize
        })
    }

    /// Checks lattice divisibility, vacancy range and population bounds.
    pub fn validate(&self) -> Result<(), DivError> {
        if self.grid_rows == 0 || self.grid_cols == 0 {
            return Err(DivError::Config(
                ErrorInfo::new("world-grid-empty", "lattice must have cells")
                    .with_context("grid_rows", self.grid_rows.to_string())
                    .with_context("grid_cols", self.grid_cols.to_string()),
            ));
        }
        if self.neighborhood_rows == 0
            || self.neighborhood_cols == 0
            || self.grid_rows % self.neighborhood_rows != 0
            || self.grid_cols % self.neighborhood_cols != 0
        {
            return Err(DivError::Config(
                ErrorInfo::new(
                    "world-neighborhood-divisibility",
                    "neighbourhood blocks must tile the lattice exactly",
                )
                .with_context("grid", format!("{}x{}", self.grid_rows, self.grid_cols))
                .with_context(
                    "neighborhoods",
                    format!("{}x{}", self.neighborhood_rows, self.neighborhood_cols),
                ),
            ));
        }
        if !(0.0..1.0).contains(&self.vacancy_fraction) {
            return Err(DivError::Config(
                ErrorInfo::new("world-vacancy", "vacancy fraction must lie in [0, 1)")
                    .with_context("vacancy_fraction", self.vacancy_fraction.to_string()),
            ));
        }
        let population = self.population();
        if population == 0 || population > self.cells() {
            return Err(DivError::Config(
                ErrorInfo::new(
                    "world-population",
                    "population must be positive and fit on the lattice",
                )
                .with_context("population", population.to_string())
                .with_context("cells", self.cells().to_string())
                .with_hint("lower population_size or raise the grid dimensions"),
            ));
        }
        Ok(())
    }
}

/// Full parameter set for one world instance.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldParams {
    /// Lattice and population settings.
    pub config: WorldConfig,
    /// Tolerance: minimum share of like neighbours an agent accepts.
    pub tolerance: f64,
    /// Group proportions, remainder group included.
    pub group_proportions: Vec<f64>,
    /// Step cap.
    pub max_iterations: u64,
}

impl WorldParams {
    /// Validates the configuration and the tolerance.
    pub fn validate(&self) -> Result<(), DivError> {
        self.config.validate()?;
        if !self.tolerance.is_finite() || !(0.0..=1.0).contains(&self.tolerance) {
            return Err(DivError::Config(
                ErrorInfo::new("world-tolerance", "tolerance must lie in [0, 1]")
                    .with_context("tolerance", self.tolerance.to_string()),
            ));
        }
        if self.group_proportions.len() < 2 {
            return Err(DivError::Scenario(
                ErrorInfo::new("scenario-groups", "a world needs at least two groups")
                    .with_context("groups", self.group_proportions.len().to_string()),
            ));
        }
        if let Some((group, value)) = self
            .group_proportions
            .iter()
            .enumerate()
            .find(|(_, value)| !value.is_finite() || **value <= 0.0)
        {
            return Err(DivError::Scenario(
                ErrorInfo::new("scenario-proportion", "proportions must be positive")
                    .with_context("group", group.to_string())
                    .with_context("value", value.to_string()),
            ));
        }
        Ok(())
    }
}
