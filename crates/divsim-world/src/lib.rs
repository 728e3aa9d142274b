#![deny(missing_docs)]
//! World-model boundary for divsim replications.
//!
//! Replication workers only see [`WorldFactory`] and [`WorldModel`]. The
//! bundled [`SchellingFactory`] provides a runnable relocation model on a
//! bounded lattice with block neighbourhoods.

pub mod config;
pub mod lattice;
pub mod model;
pub mod schelling;

pub use config::{NeighborTopology, WorldConfig, WorldParams};
pub use lattice::BoundedLattice;
pub use model::{WorldFactory, WorldModel};
pub use schelling::{SchellingFactory, SchellingWorld};
