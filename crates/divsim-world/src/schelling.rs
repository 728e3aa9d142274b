//! Reference Schelling relocation model on a bounded lattice.
//!
//! An agent is content when the share of like agents among its occupied
//! neighbours reaches the tolerance `tau`; agents without occupied neighbours
//! are content. Each tick every discontent agent, in random order, moves to a
//! uniformly drawn vacant cell. The world converges on the first tick that
//! finds nobody discontent.

use divsim_core::errors::ErrorInfo;
use divsim_core::{DivError, FrequencyTable, RngHandle};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::WorldParams;
use crate::lattice::BoundedLattice;
use crate::model::{WorldFactory, WorldModel};

/// Factory for [`SchellingWorld`] instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchellingFactory;

impl WorldFactory for SchellingFactory {
    fn build(&self, params: &WorldParams) -> Result<Box<dyn WorldModel>, DivError> {
        Ok(Box::new(SchellingWorld::new(params.clone())?))
    }
}

/// Mutable state of one Schelling replication.
#[derive(Debug, Clone)]
pub struct SchellingWorld {
    params: WorldParams,
    lattice: BoundedLattice,
    group_sizes: Vec<usize>,
    cells: Vec<Option<usize>>,
    vacant: Vec<usize>,
    ticks: u64,
    converged: bool,
    ready: bool,
}

impl SchellingWorld {
    /// Validates the parameters and sizes each group by largest remainder.
    pub fn new(params: WorldParams) -> Result<Self, DivError> {
        params.validate()?;
        let lattice = BoundedLattice::new(&params.config);
        let group_sizes = allocate(params.config.population(), &params.group_proportions);
        Ok(Self {
            lattice,
            group_sizes,
            cells: Vec::new(),
            vacant: Vec::new(),
            ticks: 0,
            converged: false,
            ready: false,
            params,
        })
    }

    /// Agents per group, in group order.
    pub fn group_sizes(&self) -> &[usize] {
        &self.group_sizes
    }

    fn is_content(&self, cell: usize, group: usize) -> bool {
        let mut occupied = 0usize;
        let mut alike = 0usize;
        for &other in self.lattice.neighbors(cell) {
            if let Some(neighbor) = self.cells[other] {
                occupied += 1;
                if neighbor == group {
                    alike += 1;
                }
            }
        }
        occupied == 0 || alike as f64 / occupied as f64 >= self.params.tolerance
    }

    fn discontent(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(cell, slot)| slot.map(|group| (cell, group)))
            .filter(|&(cell, group)| !self.is_content(cell, group))
            .map(|(cell, _)| cell)
            .collect()
    }

    fn ensure_ready(&self, operation: &str) -> Result<(), DivError> {
        if self.ready {
            Ok(())
        } else {
            Err(DivError::World(
                ErrorInfo::new("world-not-setup", "world used before setup")
                    .with_context("operation", operation),
            ))
        }
    }
}

impl WorldModel for SchellingWorld {
    fn setup(&mut self, rng: &mut RngHandle) -> Result<(), DivError> {
        let mut order: Vec<usize> = (0..self.lattice.len()).collect();
        order.shuffle(rng);
        self.cells = vec![None; self.lattice.len()];
        let mut placed = 0;
        for (group, &size) in self.group_sizes.iter().enumerate() {
            for &cell in &order[placed..placed + size] {
                self.cells[cell] = Some(group);
            }
            placed += size;
        }
        self.vacant = order[placed..].to_vec();
        self.ticks = 0;
        self.converged = false;
        self.ready = true;
        Ok(())
    }

    fn step(&mut self, rng: &mut RngHandle) -> Result<(), DivError> {
        self.ensure_ready("step")?;
        let mut movers = self.discontent();
        if movers.is_empty() {
            self.converged = true;
            return Ok(());
        }
        movers.shuffle(rng);
        for cell in movers {
            if self.vacant.is_empty() {
                break;
            }
            let slot = rng.gen_range(0..self.vacant.len());
            let target = self.vacant[slot];
            self.cells[target] = self.cells[cell].take();
            self.vacant[slot] = cell;
        }
        self.ticks += 1;
        Ok(())
    }

    fn converged(&self) -> bool {
        self.converged
    }

    fn steps_taken(&self) -> u64 {
        self.ticks
    }

    fn export(&self) -> Result<FrequencyTable, DivError> {
        self.ensure_ready("export")?;
        let n_groups = self.group_sizes.len();
        let mut counts = vec![0u64; self.lattice.n_blocks() * n_groups];
        for (cell, slot) in self.cells.iter().enumerate() {
            if let Some(group) = slot {
                counts[self.lattice.block(cell) * n_groups + group] += 1;
            }
        }
        FrequencyTable::with_default_ids(self.lattice.n_blocks(), n_groups, counts)
    }
}

/// Splits `population` across groups proportionally, handing leftover agents
/// to the largest fractional quotas.
fn allocate(population: usize, proportions: &[f64]) -> Vec<usize> {
    let total: f64 = proportions.iter().sum();
    let quotas: Vec<f64> = proportions
        .iter()
        .map(|share| share / total * population as f64)
        .collect();
    let mut sizes: Vec<usize> = quotas.iter().map(|quota| quota.floor() as usize).collect();
    let assigned: usize = sizes.iter().sum();
    let mut order: Vec<usize> = (0..sizes.len()).collect();
    order.sort_by(|&a, &b| {
        let left = quotas[a] - quotas[a].floor();
        let right = quotas[b] - quotas[b].floor();
        right.total_cmp(&left).then(a.cmp(&b))
    });
    for &group in order.iter().cycle().take(population.saturating_sub(assigned)) {
        sizes[group] += 1;
    }
    sizes
}
