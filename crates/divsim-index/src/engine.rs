//! Closed index tables and the two evaluation entry points.

use divsim_core::FrequencyTable;

use crate::{global, spatial};

/// Signature of a per-group index.
pub type SpatialFn = fn(&FrequencyTable) -> Vec<f64>;
/// Signature of a whole-table index.
pub type GlobalFn = fn(&FrequencyTable) -> f64;

/// Per-group index paired with its declared output column name.
#[derive(Debug, Clone, Copy)]
pub struct SpatialIndex {
    /// Output column name.
    pub name: &'static str,
    /// Index implementation.
    pub compute: SpatialFn,
}

/// Whole-table index paired with its declared output column name.
#[derive(Debug, Clone, Copy)]
pub struct GlobalIndex {
    /// Output column name.
    pub name: &'static str,
    /// Index implementation.
    pub compute: GlobalFn,
}

/// Per-group indices, in output column order.
pub const SPATIAL_INDICES: &[SpatialIndex] = &[
    SpatialIndex {
        name: "segregation_gsg",
        compute: spatial::segregation_gsg,
    },
    SpatialIndex {
        name: "modified_segregation_msg",
        compute: spatial::modified_segregation_msg,
    },
    SpatialIndex {
        name: "isolation_isg",
        compute: spatial::isolation_isg,
    },
    SpatialIndex {
        name: "isolation_ii",
        compute: spatial::isolation_ii,
    },
    SpatialIndex {
        name: "gini_gig",
        compute: spatial::gini_gig,
    },
    SpatialIndex {
        name: "theil_th",
        compute: spatial::theil_th,
    },
    SpatialIndex {
        name: "ellison_glaeser_egg_pop",
        compute: spatial::ellison_glaeser_egg_pop,
    },
    SpatialIndex {
        name: "maurel_sedillot_msg_pop",
        compute: spatial::maurel_sedillot_msg_pop,
    },
];

/// Whole-table indices, in output column order.
pub const GLOBAL_INDICES: &[GlobalIndex] = &[
    GlobalIndex {
        name: "abundance",
        compute: global::abundance,
    },
    GlobalIndex {
        name: "margalev_md",
        compute: global::margalev_md,
    },
    GlobalIndex {
        name: "menhinick_mi",
        compute: global::menhinick_mi,
    },
    GlobalIndex {
        name: "simpson_so",
        compute: global::simpson_so,
    },
    GlobalIndex {
        name: "simpson_sd",
        compute: global::simpson_sd,
    },
    GlobalIndex {
        name: "herfindahl_hd",
        compute: global::herfindahl_hd,
    },
    GlobalIndex {
        name: "fractionalization_gs",
        compute: global::fractionalization_gs,
    },
    GlobalIndex {
        name: "shannon_se",
        compute: global::shannon_se,
    },
    GlobalIndex {
        name: "gini_gi",
        compute: global::gini_gi,
    },
    GlobalIndex {
        name: "gini_gi_m",
        compute: global::gini_gi_m,
    },
    GlobalIndex {
        name: "hoover_hi",
        compute: global::hoover_hi,
    },
];

/// Column names of the spatial result table.
pub fn spatial_columns() -> Vec<String> {
    SPATIAL_INDICES
        .iter()
        .map(|index| index.name.to_string())
        .collect()
}

/// Column names of the global result table.
pub fn global_columns() -> Vec<String> {
    GLOBAL_INDICES
        .iter()
        .map(|index| index.name.to_string())
        .collect()
}

/// Spatial index values of a single group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupIndices {
    /// Raw group id of the source table column.
    pub group: String,
    /// One value per entry of [`SPATIAL_INDICES`].
    pub values: Vec<f64>,
}

/// Evaluates every spatial index, returning one record per group column.
pub fn spatial_indices(table: &FrequencyTable) -> Vec<GroupIndices> {
    let per_index: Vec<Vec<f64>> = SPATIAL_INDICES
        .iter()
        .map(|index| (index.compute)(table))
        .collect();
    table
        .groups()
        .iter()
        .enumerate()
        .map(|(column, group)| GroupIndices {
            group: group.clone(),
            values: per_index.iter().map(|values| values[column]).collect(),
        })
        .collect()
}

/// Evaluates every global index, in [`GLOBAL_INDICES`] order.
pub fn global_indices(table: &FrequencyTable) -> Vec<f64> {
    GLOBAL_INDICES
        .iter()
        .map(|index| (index.compute)(table))
        .collect()
}
