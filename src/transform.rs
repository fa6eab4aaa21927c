use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroUsize;

use crate::data::{cell, RowValue};
use crate::ir::{ChartColumns, GroupedDataset, GroupedDatum, MetricDatum};

/// Label of the synthetic bucket holding folded categories.
pub const OTHER_LABEL: &str = "Other";
/// Label used instead of [`OTHER_LABEL`] when everything is folded into one bar.
pub const ALL_VALUES_LABEL: &str = "All values";
/// Minimum height of a single bar, in pixels.
pub const MIN_BAR_HEIGHT: f64 = 24.0;

/// Element-wise metric addition.
///
/// null + null = null, null + x = x, x + y = x + y.
pub fn sum_metrics(left: &MetricDatum, right: &MetricDatum) -> MetricDatum {
    let mut result = left.clone();
    for (key, right_value) in right {
        let merged = match (result.get(key).copied().flatten(), *right_value) {
            (None, None) => None,
            (l, r) => Some(l.unwrap_or(0.0) + r.unwrap_or(0.0)),
        };
        result.insert(key.clone(), merged);
    }
    result
}

fn merge_breakouts(
    target: &mut BTreeMap<String, MetricDatum>,
    source: &BTreeMap<String, MetricDatum>,
) {
    for (name, metrics) in source {
        let merged = match target.get(name) {
            Some(existing) => sum_metrics(existing, metrics),
            None => metrics.clone(),
        };
        target.insert(name.clone(), merged);
    }
}

/// Fold rows into one datum per distinct dimension value, in first-seen order
pub fn group_dataset(rows: &[Vec<RowValue>], columns: &ChartColumns) -> GroupedDataset {
    let dimension_idx = columns.dimension().index;
    let metrics = columns.metrics();
    let breakout_idx = columns.breakout().map(|b| b.index);

    let mut positions: HashMap<RowValue, usize> = HashMap::new();
    let mut dataset: GroupedDataset = Vec::new();

    for row in rows {
        let dimension_value = cell(row, dimension_idx);

        let position = match positions.get(dimension_value) {
            Some(&pos) => pos,
            None => {
                dataset.push(GroupedDatum::new(dimension_value.clone()));
                positions.insert(dimension_value.clone(), dataset.len() - 1);
                dataset.len() - 1
            }
        };
        let datum = &mut dataset[position];

        let row_metrics: MetricDatum = metrics
            .iter()
            .map(|m| (m.column.name.clone(), cell(row, m.index).as_number()))
            .collect();

        datum.metrics = sum_metrics(&datum.metrics, &row_metrics);

        if let Some(idx) = breakout_idx {
            let breakout_name = cell(row, idx).to_string();
            let breakouts = datum.breakout.get_or_insert_with(BTreeMap::new);
            let merged = match breakouts.get(&breakout_name) {
                Some(existing) => sum_metrics(existing, &row_metrics),
                None => sum_metrics(&MetricDatum::new(), &row_metrics),
            };
            breakouts.insert(breakout_name, merged);
        }
    }

    debug!("Grouped {} rows into {} categories", rows.len(), dataset.len());
    dataset
}

/// Cap the number of categories, folding the tail into a single "Other" bucket.
///
/// Keeps the first `limit - 1` entries untouched and returns exactly `limit` entries
/// when the dataset is longer than `limit`.
pub fn trim_dataset(dataset: &[GroupedDatum], limit: NonZeroUsize) -> GroupedDataset {
    let limit = limit.get();
    if dataset.len() <= limit {
        return dataset.to_vec();
    }

    let (kept, folded) = dataset.split_at(limit - 1);
    let label = if limit > 1 { OTHER_LABEL } else { ALL_VALUES_LABEL };

    let mut other = GroupedDatum::new(RowValue::Text(label.to_string()));
    for datum in folded {
        other.metrics = sum_metrics(&other.metrics, &datum.metrics);
        if let Some(breakout) = &datum.breakout {
            merge_breakouts(other.breakout.get_or_insert_with(BTreeMap::new), breakout);
        }
    }

    debug!(
        "Folded {} of {} categories into '{}'",
        folded.len(),
        dataset.len(),
        label
    );

    let mut result = kept.to_vec();
    result.push(other);
    result
}

/// How many categories fit in the available height
pub fn max_category_count(
    viewport_height: f64,
    min_bar_height: f64,
    is_stacked: bool,
    series_count: usize,
) -> NonZeroUsize {
    let single_value_height = if is_stacked {
        min_bar_height
    } else {
        min_bar_height * series_count.max(1) as f64
    };

    let count = (viewport_height / single_value_height).floor();
    let count = if count.is_finite() && count > 1.0 { count as usize } else { 1 };
    NonZeroUsize::new(count).unwrap_or(NonZeroUsize::MIN)
}
