use log::{debug, warn};
use std::collections::HashSet;

use crate::data::{cell, RowValue};
use crate::ir::{ChartColumns, ColumnDescriptor, Series, SeriesAccessor, SeriesInfo};
use crate::palette::ColorPalette;
use crate::settings::VisualizationSettings;

/// Distinct stringified breakout values, in first-seen order, with the raw value that produced each
pub fn breakout_distinct_values(
    rows: &[Vec<RowValue>],
    breakout: &ColumnDescriptor,
) -> Vec<(String, RowValue)> {
    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for row in rows {
        let raw = cell(row, breakout.index);
        let name = raw.to_string();
        if seen.insert(name.clone()) {
            values.push((name, raw.clone()));
        }
    }
    values
}

/// Build one series per breakout value, or one per metric column.
///
/// Output order and keys depend only on the inputs, so user overrides keyed by
/// series key stay attached across renders.
pub fn build_series(
    rows: &[Vec<RowValue>],
    columns: &ChartColumns,
    settings: &VisualizationSettings,
    palette: &ColorPalette,
) -> Vec<Series> {
    let series = match columns {
        ChartColumns::Breakout {
            dimension,
            breakout,
            metric,
        } => breakout_distinct_values(rows, breakout)
            .into_iter()
            .enumerate()
            .map(|(index, (name, raw))| Series {
                key: name.clone(),
                title: name.clone(),
                color: palette.color_for(index).to_string(),
                accessor: SeriesAccessor::Breakout {
                    breakout_value: name,
                    metric: metric.column.name.clone(),
                },
                info: SeriesInfo {
                    metric_column: metric.column.clone(),
                    dimension_column: dimension.column.clone(),
                    breakout_value: Some(raw),
                },
            })
            .collect::<Vec<_>>(),
        ChartColumns::MultipleMetrics { dimension, metrics } => metrics
            .iter()
            .enumerate()
            .map(|(index, metric)| Series {
                key: metric.column.name.clone(),
                title: metric.column.display_name.clone(),
                color: palette.color_for(index).to_string(),
                accessor: SeriesAccessor::Metric {
                    metric: metric.column.name.clone(),
                },
                info: SeriesInfo {
                    metric_column: metric.column.clone(),
                    dimension_column: dimension.column.clone(),
                    breakout_value: None,
                },
            })
            .collect(),
    };

    let series = apply_series_order(series, settings);
    let series = apply_series_settings(series, settings);
    debug!("Built {} series", series.len());
    series
}

/// Keep only enabled series, in the configured order
fn apply_series_order(series: Vec<Series>, settings: &VisualizationSettings) -> Vec<Series> {
    let Some(order) = settings.series_order.as_ref() else {
        return series;
    };

    let mut ordered = Vec::with_capacity(series.len());
    for entry in order.iter().filter(|entry| entry.enabled) {
        let key = entry.key.as_deref().unwrap_or(&entry.name);
        match series.iter().find(|s| s.key == key) {
            Some(found) => {
                let mut found = found.clone();
                if let Some(color) = &entry.color {
                    found.color = color.clone();
                }
                ordered.push(found);
            }
            None => warn!("Series order entry '{}' does not match any series", key),
        }
    }
    ordered
}

fn apply_series_settings(mut series: Vec<Series>, settings: &VisualizationSettings) -> Vec<Series> {
    for s in &mut series {
        if let Some(overrides) = settings.series_settings.get(&s.key) {
            if let Some(color) = &overrides.color {
                s.color = color.clone();
            }
            if let Some(title) = &overrides.title {
                s.title = title.clone();
            }
        }
    }
    series
}
