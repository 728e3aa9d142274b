//! Whole-table diversity indices.
//!
//! Each function reduces the table to one scalar, working mostly on the group
//! totals `X_g` and the population `T`. Tables too small for an index's
//! denominator (no population, a single individual) yield `0.0`.

use divsim_core::FrequencyTable;

use crate::profile::{gini, Profile};

/// Number of groups with at least one member.
pub fn abundance(table: &FrequencyTable) -> f64 {
    table
        .column_totals()
        .into_iter()
        .filter(|&total| total > 0)
        .count() as f64
}

/// Margalev richness: `(abundance − 1) / ln T`.
pub fn margalev_md(table: &FrequencyTable) -> f64 {
    let total = table.total() as f64;
    if total <= 1.0 {
        return 0.0;
    }
    (abundance(table) - 1.0) / total.ln()
}

/// Menhinick richness: `(abundance − 1) / √T`.
pub fn menhinick_mi(table: &FrequencyTable) -> f64 {
    let total = table.total() as f64;
    if total <= 0.0 {
        return 0.0;
    }
    (abundance(table) - 1.0) / total.sqrt()
}

/// Simpson's probability that two draws without replacement share a group.
pub fn simpson_so(table: &FrequencyTable) -> f64 {
    let profile = Profile::new(table);
    if profile.total <= 1.0 {
        return 0.0;
    }
    let same: f64 = profile
        .group_totals
        .iter()
        .map(|count| count * (count - 1.0))
        .sum();
    same / (profile.total * (profile.total - 1.0))
}

/// Simpson diversity, `1 − simpson_so`.
pub fn simpson_sd(table: &FrequencyTable) -> f64 {
    if table.total() <= 1 {
        return 0.0;
    }
    1.0 - simpson_so(table)
}

/// Herfindahl concentration of group shares, `Σ_g p_g²`.
pub fn herfindahl_hd(table: &FrequencyTable) -> f64 {
    let profile = Profile::new(table);
    (0..profile.n_groups())
        .map(|group| profile.group_share(group).powi(2))
        .sum()
}

/// Fractionalization, `1 − herfindahl_hd`.
pub fn fractionalization_gs(table: &FrequencyTable) -> f64 {
    if table.total() == 0 {
        return 0.0;
    }
    1.0 - herfindahl_hd(table)
}

/// Shannon entropy of group shares; absent groups contribute nothing.
pub fn shannon_se(table: &FrequencyTable) -> f64 {
    let profile = Profile::new(table);
    -(0..profile.n_groups())
        .map(|group| profile.group_share(group))
        .filter(|&share| share > 0.0)
        .map(|share| share * share.ln())
        .sum::<f64>()
}

/// Gini coefficient of the group totals.
pub fn gini_gi(table: &FrequencyTable) -> f64 {
    let profile = Profile::new(table);
    let mut totals = profile.group_totals.clone();
    gini(&mut totals)
}

/// Mean absolute difference form of the Gini coefficient of group totals.
///
/// `Σ_{i≠j} |X_i − X_j| / (2 n² mean(X))`.
pub fn gini_gi_m(table: &FrequencyTable) -> f64 {
    let profile = Profile::new(table);
    let totals = &profile.group_totals;
    let n = totals.len() as f64;
    if totals.is_empty() || profile.total <= 0.0 {
        return 0.0;
    }
    let mean = profile.total / n;
    let mut spread = 0.0;
    for (i, left) in totals.iter().enumerate() {
        for (j, right) in totals.iter().enumerate() {
            if i != j {
                spread += (left - right).abs();
            }
        }
    }
    spread / (2.0 * n * n * mean)
}

/// Hoover concentration of population across equally sized neighbourhoods.
///
/// `½ Σ_j |t_j / T − 1 / N|` over the `N` neighbourhoods.
pub fn hoover_hi(table: &FrequencyTable) -> f64 {
    let profile = Profile::new(table);
    let n = profile.n_rows() as f64;
    if profile.total <= 0.0 || n == 0.0 {
        return 0.0;
    }
    0.5 * profile
        .row_totals
        .iter()
        .map(|t| (t / profile.total - 1.0 / n).abs())
        .sum::<f64>()
}
