use divsim_core::FrequencyTable;

/// Floating point view of a frequency table with its marginals precomputed.
pub(crate) struct Profile {
    counts: Vec<f64>,
    n_groups: usize,
    pub(crate) row_totals: Vec<f64>,
    pub(crate) group_totals: Vec<f64>,
    pub(crate) total: f64,
}

impl Profile {
    pub(crate) fn new(table: &FrequencyTable) -> Self {
        let n_groups = table.n_groups();
        let mut counts = Vec::with_capacity(table.n_rows() * n_groups);
        for row in 0..table.n_rows() {
            counts.extend(table.row(row).iter().map(|&count| count as f64));
        }
        let row_totals: Vec<f64> = table.row_totals().into_iter().map(|t| t as f64).collect();
        let group_totals: Vec<f64> = table
            .column_totals()
            .into_iter()
            .map(|t| t as f64)
            .collect();
        let total = row_totals.iter().sum();
        Self {
            counts,
            n_groups,
            row_totals,
            group_totals,
            total,
        }
    }

    pub(crate) fn n_rows(&self) -> usize {
        self.row_totals.len()
    }

    pub(crate) fn n_groups(&self) -> usize {
        self.n_groups
    }

    pub(crate) fn count(&self, row: usize, group: usize) -> f64 {
        self.counts[row * self.n_groups + group]
    }

    /// Share of the whole population held by `group`; zero for an empty table.
    pub(crate) fn group_share(&self, group: usize) -> f64 {
        if self.total > 0.0 {
            self.group_totals[group] / self.total
        } else {
            0.0
        }
    }

    /// Sum of squared neighbourhood population shares.
    pub(crate) fn area_concentration(&self) -> f64 {
        if self.total <= 0.0 {
            return 0.0;
        }
        self.row_totals
            .iter()
            .map(|t| (t / self.total).powi(2))
            .sum()
    }
}

/// Gini coefficient of non-negative values; zero when the values sum to zero.
pub(crate) fn gini(values: &mut [f64]) -> f64 {
    let n = values.len() as f64;
    let sum: f64 = values.iter().sum();
    if values.is_empty() || sum <= 0.0 {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    let weighted: f64 = values
        .iter()
        .enumerate()
        .map(|(idx, value)| (idx as f64 + 1.0) * value)
        .sum();
    (2.0 * weighted) / (n * sum) - (n + 1.0) / n
}
