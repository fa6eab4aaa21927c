use serde::Serialize;

use crate::ir::{GroupedDatum, Series};

/// Offset applied after series values are accumulated per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StackOffset {
    /// Plain cumulative sums.
    None,
    /// Each category is rescaled so its segments sum to 1.
    Expand,
}

/// `(start, end)` extents indexed as `[series][datum]`.
pub type StackedSeries = Vec<Vec<(f64, f64)>>;

/// Accumulate series values per category in series order. Null values stack as 0.
pub fn stack_series(data: &[GroupedDatum], series: &[Series], offset: StackOffset) -> StackedSeries {
    let mut stacked: StackedSeries = series
        .iter()
        .map(|s| data.iter().map(|d| (0.0, s.x_value(d).unwrap_or(0.0))).collect())
        .collect();

    if offset == StackOffset::Expand {
        for j in 0..data.len() {
            let total: f64 = stacked.iter().map(|s| s[j].1).sum();
            if total != 0.0 {
                for s in stacked.iter_mut() {
                    s[j].1 /= total;
                }
            }
        }
    }

    for j in 0..data.len() {
        let mut base = 0.0;
        for s in stacked.iter_mut() {
            let value = s[j].1;
            s[j] = (base, base + value);
            base += value;
        }
    }

    stacked
}

/// Every start and end coordinate of the stack, for domain calculation
pub fn stacked_values(stacked: &StackedSeries) -> impl Iterator<Item = f64> + '_ {
    stacked
        .iter()
        .flat_map(|s| s.iter().flat_map(|&(start, end)| [start, end]))
}
