//! Traits a world model implements to be driven by a replication worker.

use divsim_core::{DivError, FrequencyTable, RngHandle};

use crate::config::WorldParams;

/// Stochastic world driven by a replication worker.
///
/// Lifecycle: [`WorldModel::setup`] once, then [`WorldModel::step`] until the
/// model reports convergence or the step cap runs out, then
/// [`WorldModel::export`].
pub trait WorldModel: Send {
    /// Places the initial population.
    fn setup(&mut self, rng: &mut RngHandle) -> Result<(), DivError>;

    /// Advances the world by one tick. Sets the convergence flag instead of
    /// ticking when the world is already stable.
    fn step(&mut self, rng: &mut RngHandle) -> Result<(), DivError>;

    /// True once the world reached a stable configuration.
    fn converged(&self) -> bool;

    /// Ticks performed so far.
    fn steps_taken(&self) -> u64;

    /// Neighbourhood by group counts of the current configuration.
    fn export(&self) -> Result<FrequencyTable, DivError>;

    /// Steps until convergence or until `max_iterations` steps were attempted.
    ///
    /// A cap of zero never checks stability, so the world stays unconverged.
    fn run(&mut self, rng: &mut RngHandle, max_iterations: u64) -> Result<(), DivError> {
        for _ in 0..max_iterations {
            if self.converged() {
                break;
            }
            self.step(rng)?;
        }
        Ok(())
    }
}

/// Builds world instances; shared by every replication of a sweep.
pub trait WorldFactory: Send + Sync {
    /// Creates an un-setup world for the given parameters.
    fn build(&self, params: &WorldParams) -> Result<Box<dyn WorldModel>, DivError>;
}
