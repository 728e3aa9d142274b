//! Per-group spatial segregation indices.
//!
//! Every function takes the full neighbourhood by group table and returns one
//! value per group column. Notation: `x_gj` count of group `g` in neighbourhood
//! `j`, `t_j` neighbourhood occupancy, `T` total population, `X_g` group total
//! and `p_g = X_g / T`. A group absent from the table, or an empty table,
//! yields `0.0`. Empty neighbourhoods contribute nothing.

use divsim_core::FrequencyTable;

use crate::profile::{gini, Profile};

/// Dissimilarity of each group against the rest of the population.
///
/// `Σ_j |x_gj − t_j p_g| / (2 T p_g (1 − p_g))`. Zero when the group is absent
/// or is the whole population.
pub fn segregation_gsg(table: &FrequencyTable) -> Vec<f64> {
    let profile = Profile::new(table);
    (0..profile.n_groups())
        .map(|group| dissimilarity(&profile, group))
        .collect()
}

fn dissimilarity(profile: &Profile, group: usize) -> f64 {
    let share = profile.group_share(group);
    let denom = 2.0 * profile.total * share * (1.0 - share);
    if denom <= 0.0 {
        return 0.0;
    }
    let spread: f64 = (0..profile.n_rows())
        .map(|row| (profile.count(row, group) - profile.row_totals[row] * share).abs())
        .sum();
    spread / denom
}

/// Dissimilarity re-weighted by the group's contribution to overall diversity.
///
/// `gsg_g · 2 p_g (1 − p_g) / (1 − Σ_h p_h²)`; zero for a single-group table.
pub fn modified_segregation_msg(table: &FrequencyTable) -> Vec<f64> {
    let profile = Profile::new(table);
    let concentration: f64 = (0..profile.n_groups())
        .map(|group| profile.group_share(group).powi(2))
        .sum();
    let diversity = 1.0 - concentration;
    (0..profile.n_groups())
        .map(|group| {
            if diversity <= 0.0 {
                return 0.0;
            }
            let share = profile.group_share(group);
            dissimilarity(&profile, group) * 2.0 * share * (1.0 - share) / diversity
        })
        .collect()
}

/// Exposure of a group member to its own group: `Σ_j (x_gj/X_g)(x_gj/t_j)`.
pub fn isolation_isg(table: &FrequencyTable) -> Vec<f64> {
    let profile = Profile::new(table);
    (0..profile.n_groups())
        .map(|group| isolation(&profile, group))
        .collect()
}

fn isolation(profile: &Profile, group: usize) -> f64 {
    let group_total = profile.group_totals[group];
    if group_total <= 0.0 {
        return 0.0;
    }
    (0..profile.n_rows())
        .filter(|&row| profile.row_totals[row] > 0.0)
        .map(|row| {
            let count = profile.count(row, group);
            (count / group_total) * (count / profile.row_totals[row])
        })
        .sum()
}

/// Isolation relative to the group's population share: `isg_g / p_g`.
///
/// Equals one under random mixing and `1 / p_g` under complete segregation.
pub fn isolation_ii(table: &FrequencyTable) -> Vec<f64> {
    let profile = Profile::new(table);
    (0..profile.n_groups())
        .map(|group| {
            let share = profile.group_share(group);
            if share <= 0.0 {
                0.0
            } else {
                isolation(&profile, group) / share
            }
        })
        .collect()
}

/// Gini coefficient of each group's counts across neighbourhoods.
pub fn gini_gig(table: &FrequencyTable) -> Vec<f64> {
    let profile = Profile::new(table);
    (0..profile.n_groups())
        .map(|group| {
            let mut column: Vec<f64> = (0..profile.n_rows())
                .map(|row| profile.count(row, group))
                .collect();
            gini(&mut column)
        })
        .collect()
}

/// Theil divergence of a group's spatial distribution from the population's.
///
/// `Σ_j s_gj ln(s_gj / (t_j/T))` with `s_gj = x_gj / X_g`; terms with
/// `x_gj = 0` are zero.
pub fn theil_th(table: &FrequencyTable) -> Vec<f64> {
    let profile = Profile::new(table);
    (0..profile.n_groups())
        .map(|group| {
            let group_total = profile.group_totals[group];
            if group_total <= 0.0 {
                return 0.0;
            }
            (0..profile.n_rows())
                .filter(|&row| profile.count(row, group) > 0.0)
                .map(|row| {
                    let share = profile.count(row, group) / group_total;
                    let area = profile.row_totals[row] / profile.total;
                    share * (share / area).ln()
                })
                .sum()
        })
        .collect()
}

/// Ellison-Glaeser concentration with every individual counted as a plant.
///
/// `(G − (1 − A) H) / ((1 − A)(1 − H))` where `G = Σ_j (s_gj − a_j)²`,
/// `a_j = t_j / T`, `A = Σ_j a_j²` and `H = 1 / X_g`. Zero when the group has
/// fewer than two members or the population sits in one neighbourhood.
pub fn ellison_glaeser_egg_pop(table: &FrequencyTable) -> Vec<f64> {
    let profile = Profile::new(table);
    let area = profile.area_concentration();
    (0..profile.n_groups())
        .map(|group| {
            let Some(herfindahl) = plant_herfindahl(&profile, group) else {
                return 0.0;
            };
            let denom = (1.0 - area) * (1.0 - herfindahl);
            if denom <= 0.0 {
                return 0.0;
            }
            let group_total = profile.group_totals[group];
            let raw: f64 = (0..profile.n_rows())
                .map(|row| {
                    let share = profile.count(row, group) / group_total;
                    let area_share = profile.row_totals[row] / profile.total;
                    (share - area_share).powi(2)
                })
                .sum();
            (raw - (1.0 - area) * herfindahl) / denom
        })
        .collect()
}

/// Maurel-Sédillot concentration with every individual counted as a plant.
///
/// `((Σ_j s_gj² − A) / (1 − A) − H) / (1 − H)`, same guards as
/// [`ellison_glaeser_egg_pop`].
pub fn maurel_sedillot_msg_pop(table: &FrequencyTable) -> Vec<f64> {
    let profile = Profile::new(table);
    let area = profile.area_concentration();
    (0..profile.n_groups())
        .map(|group| {
            let Some(herfindahl) = plant_herfindahl(&profile, group) else {
                return 0.0;
            };
            if area >= 1.0 || herfindahl >= 1.0 {
                return 0.0;
            }
            let group_total = profile.group_totals[group];
            let squared: f64 = (0..profile.n_rows())
                .map(|row| (profile.count(row, group) / group_total).powi(2))
                .sum();
            ((squared - area) / (1.0 - area) - herfindahl) / (1.0 - herfindahl)
        })
        .collect()
}

fn plant_herfindahl(profile: &Profile, group: usize) -> Option<f64> {
    let group_total = profile.group_totals[group];
    if group_total <= 0.0 {
        None
    } else {
        Some(1.0 / group_total)
    }
}
