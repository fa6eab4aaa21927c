use log::debug;

use crate::data::TabularResult;
use crate::error::{ChartError, ChartResult};
use crate::ir::{ChartColumns, ColumnDescriptor};
use crate::settings::VisualizationSettings;

/// Resolve the configured dimension/breakout/metric names against the result columns.
///
/// An unresolved name is a "pick fields" condition, not a crash.
pub fn resolve_chart_columns(
    data: &TabularResult,
    settings: &VisualizationSettings,
) -> ChartResult<ChartColumns> {
    let mut dimension_names = settings.dimensions.iter();

    let dimension_name = dimension_names
        .next()
        .ok_or_else(|| ChartError::incomplete("no dimension column selected"))?;
    let dimension = find_column(data, dimension_name)?;

    let breakout = dimension_names
        .next()
        .map(|name| find_column(data, name))
        .transpose()?;

    if settings.metrics.is_empty() {
        return Err(ChartError::incomplete("no metric column selected"));
    }
    let mut metrics = settings
        .metrics
        .iter()
        .map(|name| find_column(data, name))
        .collect::<ChartResult<Vec<_>>>()?;

    let columns = match breakout {
        Some(breakout) => {
            // A breakout splits exactly one metric
            let metric = metrics.swap_remove(0);
            ChartColumns::Breakout {
                dimension,
                breakout,
                metric,
            }
        }
        None => ChartColumns::MultipleMetrics { dimension, metrics },
    };

    debug!(
        "Resolved chart columns: dimension='{}', breakout={:?}, metrics={:?}",
        columns.dimension().column.name,
        columns.breakout().map(|b| b.column.name.as_str()),
        columns
            .metrics()
            .iter()
            .map(|m| m.column.name.as_str())
            .collect::<Vec<_>>()
    );

    Ok(columns)
}

fn find_column(data: &TabularResult, name: &str) -> ChartResult<ColumnDescriptor> {
    let index = data
        .column_index(name)
        .ok_or_else(|| ChartError::incomplete(format!("column '{}' not found", name)))?;
    Ok(ColumnDescriptor {
        index,
        column: data.cols[index].clone(),
    })
}
