#![deny(missing_docs)]
//! Index Engine: pure diversity and segregation statistics over neighbourhood
//! frequency tables.
//!
//! The set of indices is closed. [`SPATIAL_INDICES`] and [`GLOBAL_INDICES`]
//! list every function with its declared output column name; adding or
//! removing an index means editing those tables.

pub mod engine;
pub mod global;
mod profile;
pub mod reduce;
pub mod spatial;

pub use engine::{
    global_columns, global_indices, spatial_columns, spatial_indices, GlobalFn, GlobalIndex,
    GroupIndices, SpatialFn, SpatialIndex, GLOBAL_INDICES, SPATIAL_INDICES,
};
pub use reduce::{empty_results, reduce_map_into};
